// Mock frame source
//
// Stands in for a training process when no live producer is available.
// After a short simulated connection delay it reports Connected and emits a
// synthetic frame every cadence tick. Successive frames differ in step,
// episode and camera colors so scrubbing through them is visibly distinct.

use crate::frame::{Frame, ImageSet};
use crate::history::FrameSink;
use crate::net::{ConnectionStatus, LinkStats, Producer};
use serde_json::{json, Map, Value};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default interval between synthetic frames
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(500);

/// Default simulated connection latency before the first frame
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(500);

/// Palette cycled through by the placeholder camera images
const PALETTE: [&str; 6] = ["#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#8B5CF6", "#EC4899"];

/// Steps per synthetic episode
const STEPS_PER_EPISODE: u64 = 50;

const CAMERAS: [&str; 3] = ["camera_front", "camera_wrist", "camera_top"];

/// Timer-driven synthetic producer
#[derive(Debug)]
pub struct MockSource {
    cadence: Duration,
    startup_delay: Duration,
    status: ConnectionStatus,
    next_emit: Option<Instant>,
    emitted: u64,
    starts: u64,
}

impl MockSource {
    pub fn new(cadence: Duration, startup_delay: Duration) -> Self {
        Self {
            cadence,
            startup_delay,
            status: ConnectionStatus::Connecting,
            next_emit: None,
            emitted: 0,
            starts: 0,
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.next_emit.is_some()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE, DEFAULT_STARTUP_DELAY)
    }
}

impl Producer for MockSource {
    fn start(&mut self, now: Instant) {
        if self.next_emit.is_some() {
            return;
        }
        self.status = ConnectionStatus::Connecting;
        self.next_emit = Some(now + self.startup_delay);
        self.starts += 1;
        tracing::info!(
            cadence_ms = self.cadence.as_millis() as u64,
            "Mock source started"
        );
    }

    fn poll(&mut self, now: Instant, sink: &mut dyn FrameSink) -> usize {
        let Some(due) = self.next_emit else {
            return 0;
        };
        if now < due {
            return 0;
        }

        if self.status != ConnectionStatus::Connected {
            self.status = ConnectionStatus::Connected;
            tracing::info!("Mock source connected");
        }

        sink.push(synthetic_frame(self.emitted, wall_clock_ms()));
        self.emitted += 1;

        // Skip missed ticks instead of bursting after a late poll
        let next = due + self.cadence;
        self.next_emit = Some(if next <= now { now + self.cadence } else { next });
        1
    }

    fn stop(&mut self) {
        if self.next_emit.take().is_some() {
            tracing::info!(emitted = self.emitted, "Mock source stopped");
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.status
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.next_emit
    }

    fn stats(&self) -> LinkStats {
        LinkStats {
            attempts: self.starts,
            frames: self.emitted,
            decode_failures: 0,
        }
    }
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Self-contained SVG placeholder image
fn placeholder_image(color: &str, label: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='640' height='480'>\
         <rect width='640' height='480' fill='{}'/>\
         <text x='320' y='240' fill='white' font-size='20' text-anchor='middle'>{}</text></svg>",
        color, label
    );
    // '#' starts a fragment inside a URI
    format!("data:image/svg+xml;utf8,{}", svg.replace('#', "%23"))
}

/// Build the `index`-th synthetic frame
pub fn synthetic_frame(index: u64, timestamp: i64) -> Frame {
    let color = |offset: u64| PALETTE[((index + offset) % PALETTE.len() as u64) as usize];

    let metadata: Map<String, Value> = match json!({
        "prompt": "Pick up the red block and place it in the box",
        "num_icl_examples": 3,
        "icl_prompts": [
            "Pick up the blue cup",
            "Move the yellow toy",
            "Grasp the green marker"
        ],
        "episode": index / STEPS_PER_EPISODE,
        "step": index,
        "scene": "kitchen_table_01"
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let observation_images: ImageSet = CAMERAS
        .iter()
        .enumerate()
        .map(|(offset, camera)| {
            (
                camera.to_string(),
                placeholder_image(color(offset as u64), "Mock Image"),
            )
        })
        .collect();

    let icl_images = [("#EF4444", "#EC4899"), ("#06B6D4", "#8B5CF6"), ("#F97316", "#84CC16")]
        .iter()
        .map(|(observation, action)| {
            [
                ("observation".to_string(), placeholder_image(observation, "Mock Image")),
                ("action".to_string(), placeholder_image(action, "Mock Image")),
            ]
            .into_iter()
            .collect::<ImageSet>()
        })
        .collect();

    Frame {
        timestamp,
        metadata,
        query_image: Some(placeholder_image("#8B5CF6", "Mock Image")),
        observation_images: Some(observation_images),
        icl_images: Some(icl_images),
    }
}
