// In demos/pipe.rs
// Streams random bytes from a producer thread to a consumer thread through a
// ByteRing and compares SHA-256 digests of both ends.
//
// cargo run --example pipe -- [bytes] [capacity] [chunk]
use crossbeam_utils::Backoff;
use dmxp_bytering::RingBuilder;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn arg(args: &[String], idx: usize, default: usize) -> usize {
    args.get(idx)
        .map(|s| s.parse().expect("arguments must be byte counts"))
        .unwrap_or(default)
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let total = arg(&args, 1, 100_000);
    let capacity = arg(&args, 2, 5000);
    let chunk = arg(&args, 3, 1000).max(1);

    let ring = Arc::new(RingBuilder::new().with_capacity(capacity).build()?);
    println!(
        "Pipe: {} bytes through a {} byte ring in {} byte chunks",
        total,
        ring.capacity(),
        chunk
    );

    let start = std::time::Instant::now();

    let producer = {
        let ring = ring.clone();
        thread::spawn(move || -> std::io::Result<_> {
            let mut hasher = Sha256::new();
            let mut data = vec![0u8; chunk];
            let mut sent = 0;
            let mut retries = 0u64;

            while sent < total {
                let len = chunk.min(total - sent);
                fastrand::fill(&mut data[..len]);
                hasher.update(&data[..len]);

                let backoff = Backoff::new();
                while ring.write(&data[..len])? == 0 {
                    retries += 1;
                    backoff.snooze();
                }
                sent += len;
            }
            Ok((hasher.finalize(), retries))
        })
    };

    let consumer = {
        let ring = ring.clone();
        thread::spawn(move || -> std::io::Result<_> {
            let mut hasher = Sha256::new();
            let mut buf = vec![0u8; chunk];
            let mut received = 0;
            let mut short_reads = 0u64;

            while received < total {
                let n = ring.read(&mut buf)?;
                if n < buf.len() {
                    short_reads += 1;
                }
                hasher.update(&buf[..n]);
                received += n;
            }
            Ok((hasher.finalize(), short_reads))
        })
    };

    let (sent_digest, retries) = producer.join().expect("producer panicked")?;
    let (received_digest, short_reads) = consumer.join().expect("consumer panicked")?;
    let elapsed = start.elapsed();

    println!("Producer: sha256 {:x} ({} full-ring retries)", sent_digest, retries);
    println!("Consumer: sha256 {:x} ({} short reads)", received_digest, short_reads);
    println!(
        "Throughput: {:.2} MB/s",
        total as f64 / elapsed.as_secs_f64() / (1024.0 * 1024.0)
    );

    ring.teardown();

    if sent_digest == received_digest {
        println!("OK: streams match");
        Ok(())
    } else {
        eprintln!("MISMATCH: streams differ");
        std::process::exit(1);
    }
}
