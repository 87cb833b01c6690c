mod menu;
mod text;
