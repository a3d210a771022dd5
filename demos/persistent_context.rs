//! Persistent Context
//!
//! This example demonstrates a storage-backed context that survives
//! process restarts.
//!
//! Key concepts:
//! - `FileContext` writes a snapshot on every mutation
//! - An exclusive lock file guards the snapshot while the context is open
//! - The lock is released on `close()` or when the context is dropped
//! - Snapshots round-trip through JSON and a compact binary form
//!
//! Run with: cargo run --example persistent_context

use ensemble::context::{Context, ContextSnapshot, Extent, FileContext, InMemoryContext, Scope};
use ensemble::expr::Value;

fn main() {
    println!("=== Persistent Context ===\n");

    let dir = std::env::temp_dir().join(format!("ensemble-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir is writable");
    let path = dir.join("persistent.json");

    // First session: create a counter and bump it through an extent.
    {
        let mut persistent = FileContext::open(&path, Scope::Persistent).expect("open");
        persistent.create("runs", Value::Integer(1)).expect("new variable");

        let mut local = InMemoryContext::new(Scope::Local);
        let mut extent = Extent::new(&mut local).enclose(&mut persistent);
        extent.assign("runs", Value::Integer(2)).expect("visible variable");
        println!("Session 1 stored runs = {}", extent.get("runs").expect("runs"));

        // A second open while the first is held is refused.
        match FileContext::open(&path, Scope::Persistent) {
            Ok(_) => println!("Unexpected: lock not held"),
            Err(error) => println!("Second open refused: {error}"),
        }
    }

    // Second session: the value survived and the lock was released on drop.
    let persistent = FileContext::open(&path, Scope::Persistent).expect("reopen");
    println!("Session 2 read runs = {}", persistent.get("runs").expect("runs"));

    let snapshot = ContextSnapshot::capture(&persistent).expect("capture");
    let json = snapshot.to_json().expect("json");
    let binary = snapshot.to_binary().expect("binary");
    println!(
        "\nSnapshot {} ({} bytes as JSON, {} bytes as binary)",
        snapshot.id,
        json.len(),
        binary.len()
    );

    persistent.close().expect("release lock");
    std::fs::remove_dir_all(&dir).ok();
}
