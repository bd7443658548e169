/// Benchmark for identity cache performance
///
/// Measures the throughput of repeated procedure and aggregate lookups on a
/// warmed object model against the cost of cold loads through the gateway.

use dbmeta::{
    CatalogSnapshot, Database, MemoryCatalogGateway, ModelConfig, OverloadedObject,
    VoidProgressMonitor,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SAMPLE_CATALOG: &str = include_str!("../demos/sample_catalog.json");

fn open(latency: Option<Duration>) -> (Arc<MemoryCatalogGateway>, Arc<Database>) {
    let snapshot = CatalogSnapshot::from_json_str(SAMPLE_CATALOG).expect("Invalid sample catalog");
    let mut gateway = MemoryCatalogGateway::new(snapshot);
    if let Some(latency) = latency {
        gateway = gateway.with_latency(latency);
    }
    let gateway = Arc::new(gateway);
    let db = Database::open("demo", gateway.clone(), ModelConfig::default())
        .expect("Failed to open catalog model");
    (gateway, db)
}

fn main() {
    println!("=== Object Cache Throughput Benchmark ===\n");
    let monitor = VoidProgressMonitor;
    let iterations = 10_000;

    // Cold loads with a simulated round trip
    println!("Benchmark: cold warm-up with 1ms catalog latency");
    let (gateway, db) = open(Some(Duration::from_millis(1)));
    let cold_start = Instant::now();
    let report = db.warm_up(&monitor).expect("warm-up failed");
    let cold_duration = cold_start.elapsed();
    println!("  Loaded: {:?}", report);
    println!("  Catalog queries: {}", gateway.total_queries());
    println!("  Time: {:?}", cold_duration);
    println!();

    // Cached lookups by id
    println!("Benchmark: get_procedure() - repeated cached calls");
    let (gateway, db) = open(None);
    let public = db
        .get_schema_by_name(&monitor, "public")
        .expect("schema lookup failed")
        .expect("public schema missing");
    public.get_procedures(&monitor).expect("listing failed");
    gateway.reset_counters();

    let lookup_start = Instant::now();
    for i in 0..iterations {
        let id = [42, 43, 50, 51, 52][i % 5];
        let _procedure = public.get_procedure(&monitor, id);
    }
    let lookup_duration = lookup_start.elapsed();
    let lookup_ops_per_sec = iterations as f64 / lookup_duration.as_secs_f64();
    println!("  Iterations: {}", iterations);
    println!("  Time: {:?}", lookup_duration);
    println!("  Throughput: {:.0} calls/sec", lookup_ops_per_sec);
    println!("  Catalog queries: {}", gateway.total_queries());
    println!();

    // Overloaded name rendering over cached aggregates
    println!("Benchmark: overloaded_name() over cached aggregates");
    let aggregates = public.get_aggregates(&monitor).expect("listing failed");
    let naming_start = Instant::now();
    let mut rendered = 0usize;
    for _ in 0..iterations {
        for aggregate in &aggregates {
            rendered += aggregate.overloaded_name().len();
        }
    }
    let naming_duration = naming_start.elapsed();
    let names_per_sec = (iterations * aggregates.len()) as f64 / naming_duration.as_secs_f64();
    println!("  Names rendered: {} ({} bytes)", iterations * aggregates.len(), rendered);
    println!("  Time: {:?}", naming_duration);
    println!("  Throughput: {:.0} names/sec", names_per_sec);
    println!();

    println!("=== Summary ===");
    println!("  cold warm-up:    {:?}", cold_duration);
    println!("  get_procedure(): {:.0} calls/sec", lookup_ops_per_sec);
    println!("  overloaded_name(): {:.0} names/sec", names_per_sec);
}
