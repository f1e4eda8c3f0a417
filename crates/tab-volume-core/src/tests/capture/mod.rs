mod graph;
mod offscreen;
