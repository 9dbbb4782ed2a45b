//! FLV Recorder - Records synthetic publish sessions to FLV files
//!
//! Run with: cargo run --example flv_recorder -- [output_dir]
//!
//! This example demonstrates:
//! - Using the process-wide registry from the composition root
//! - Recording several concurrent streams with `StreamRecorder`
//! - Reading vhost/stream statistics back out of the registry
//!
//! # Architecture
//!
//! ```text
//!   task "s1" ──┐                       +------------------+
//!   task "s2" ──┼─► StreamRecorder ────►│  live_app_s1.flv │
//!   task "s3" ──┘        │              │  live_app_s2.flv │
//!                        ▼              +------------------+
//!                 registry::global()
//!                 (vhosts, streams, codec info, frame counts)
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use rtmp_ingest::amf::{amf0, AmfValue};
use rtmp_ingest::ingest::{RecorderConfig, StreamRecorder};
use rtmp_ingest::registry::{self, Request};

/// AVC sequence header: High profile, level 3.1, one SPS and one PPS
const AVC_SEQUENCE_HEADER: &[u8] = &[
    0x17, 0x00, 0x00, 0x00, 0x00, 0x01, 0x64, 0x00, 0x1F, 0xFF, 0xE1, 0x00, 0x04, 0x67, 0x64, 0x00,
    0x1F, 0x01, 0x00, 0x02, 0x68, 0xEE,
];

/// AAC sequence header: LC, 44.1 kHz, stereo
const AAC_SEQUENCE_HEADER: &[u8] = &[0xAF, 0x00, 0x12, 0x10];

/// Frames per synthetic stream (10 seconds at 25 fps)
const FRAME_COUNT: u32 = 250;

fn metadata() -> rtmp_ingest::Result<Bytes> {
    let props = AmfValue::ecma_array([
        ("width", AmfValue::from(1280.0)),
        ("height", AmfValue::from(720.0)),
        ("framerate", AmfValue::from(25.0)),
        ("videocodecid", AmfValue::from(7.0)),
        ("audiocodecid", AmfValue::from(10.0)),
        ("encoder", AmfValue::from("flv_recorder demo")),
    ]);

    Ok(amf0::encode_all(&[AmfValue::from("onMetaData"), props])?)
}

fn video_frame(index: u32) -> Bytes {
    // Keyframe every 50 frames, AVC NALU packet, dummy slice data
    let first = if index % 50 == 0 { 0x17 } else { 0x27 };
    let nal_type = if index % 50 == 0 { 0x65 } else { 0x41 };
    Bytes::from(vec![
        first, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, nal_type, 0x88,
    ])
}

async fn record(output_dir: &Path, stream: &str) -> rtmp_ingest::Result<PathBuf> {
    let registry = registry::global();
    let request = Request::new("live", "app", stream);
    let cid = registry.ids().next_id();

    let path = output_dir.join(format!("live_app_{}.flv", stream));
    let sink = BufWriter::new(File::create(&path)?);

    let mut recorder = StreamRecorder::new(registry, request, cid, sink, RecorderConfig::default());
    recorder.start().await?;
    recorder.on_metadata(metadata()?).await?;
    recorder
        .on_video(0, Bytes::from_static(AVC_SEQUENCE_HEADER))
        .await?;
    recorder
        .on_audio(0, Bytes::from_static(AAC_SEQUENCE_HEADER))
        .await?;

    for i in 0..FRAME_COUNT {
        let ts = i * 40;
        recorder.on_video(ts, video_frame(i)).await?;
        recorder
            .on_audio(ts, Bytes::from_static(&[0xAF, 0x01, 0x21, 0x10, 0x04]))
            .await?;
        tokio::task::yield_now().await;
    }

    let (_, stats) = recorder.finish().await?;
    println!(
        "[{}] Recording complete: {} ({} video, {} audio tags, {} bytes)",
        cid,
        path.display(),
        stats.video_tags,
        stats.audio_tags,
        stats.bytes_written
    );

    Ok(path)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtmp_ingest=info".parse()?)
                .add_directive("flv_recorder=info".parse()?),
        )
        .init();

    // Output directory for recordings (current directory by default)
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)?;
    }

    println!("FLV Recorder");
    println!("============");
    println!("Output dir: {}", output_dir.display());
    println!();

    let mut handles = Vec::new();
    for stream in ["s1", "s2", "s3"] {
        let output_dir = output_dir.clone();
        handles.push(tokio::spawn(async move {
            record(&output_dir, stream).await
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await? {
            eprintln!("Recording failed: {}", e);
        }
    }

    println!();
    println!("Registry");
    println!("--------");
    let registry = registry::global();
    for vhost in registry.vhosts().await {
        println!(
            "vhost #{} '{}': {} active streams, {} clients",
            vhost.id, vhost.name, vhost.nb_streams, vhost.nb_clients
        );
    }
    for stream in registry.streams().await {
        println!(
            "stream #{} '{}': active={} frames={}",
            stream.id, stream.url, stream.active, stream.nb_frames
        );
    }

    Ok(())
}
