pub mod puzzles;
