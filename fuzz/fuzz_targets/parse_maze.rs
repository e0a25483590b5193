#![no_main]

use libfuzzer_sys::fuzz_target;
use maze_solvers::WalledMaze;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(maze) = WalledMaze::try_from(text) {
        let (rows, cols) = maze.dimensions();
        if rows > 40 || cols > 40 {
            // Display truncates large mazes.
            return;
        }
        // Whatever parses must render back to itself.
        let rendered = maze.to_string();
        assert_eq!(WalledMaze::try_from(rendered.as_str()), Ok(maze));
    }
});
