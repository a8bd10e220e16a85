//! End-to-end album traversal tests using Cucumber.
//!
//! Scenarios drive the full orchestrator against the simulated album:
//!
//! ```bash
//! cargo test --test interfaces
//! ```

mod steps;

use cucumber::World;
use steps::traversal::AlbumWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Album Traversal Tests ===\n");
    AlbumWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/album_traversal.feature")
        .await;
}
