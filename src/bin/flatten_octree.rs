//! Runs one flatten pass over a serialized `OctreeMessage`, with the robot at a fixed pose.
//!
//! ```text
//! RUST_LOG=info flatten_octree tree.bin --x 1.0 --z 0.6 --output flat.bin
//! ```

use octoflat::prelude::*;
use octoflat::storage::Timestamp;

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Project an octree onto a height map and flatten its ground")]
struct Args {
    /// A serialized octree message.
    input: PathBuf,

    /// Robot position in the world frame.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f32,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    z: f32,
    /// Robot heading in radians.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f32,

    /// A TOML file with the pass configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the flattened tree in the compact binary format.
    #[arg(long)]
    binary: bool,

    /// Where to write the flattened octree message.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the height map as a PNG. Requires the `image` feature.
    #[arg(long)]
    height_map: Option<PathBuf>,
}

/// Answers every request with the image it was sent.
struct EchoService;

impl HeightMapService for EchoService {
    fn process_height_map(
        &mut self,
        image: &HeightImage,
    ) -> octoflat::flatten::Result<HeightImage> {
        Ok(image.clone())
    }
}

#[derive(Default)]
struct LastOutputs {
    image: Option<HeightImage>,
    octree: Option<OctreeMessage>,
}

impl FlattenSink for LastOutputs {
    fn publish_marker(&mut self, marker: BoundingBoxMarker) {
        tracing::info!(
            namespace = %marker.namespace,
            position = ?marker.position,
            scale = ?marker.scale,
            "marker"
        );
    }

    fn publish_height_image(&mut self, image: HeightImage) {
        self.image = Some(image);
    }

    fn publish_octree(&mut self, message: OctreeMessage) {
        self.octree = Some(message);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            FlattenConfig::from_toml_str(&text)?
        }
        None => FlattenConfig::default(),
    };

    let bytes = fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let message = OctreeMessage::from_bytes(&bytes)?;

    let pose = Pose::new(PointN([args.x, args.y, args.z]), args.yaw);
    let poses = move |_: &str, _: &str, _: Timestamp| -> octoflat::flatten::Result<Pose> { Ok(pose) };

    let mut pass = FlattenPass::new(
        ConfigHandle::new(config),
        poses,
        EchoService,
        LastOutputs::default(),
    )
    .with_binary_output(args.binary);
    let report = pass.process(&message, message.header.stamp)?;

    println!(
        "{}x{} height map, {} occupied of {} visited leaves",
        report.image_width, report.image_height, report.raster.occupied, report.raster.visited
    );
    match &report.flatten {
        Some(f) => println!(
            "ground at {:.3} m, relocated {} leaves, {} -> {} nodes",
            f.ground_height, f.relocated, f.nodes_before, f.nodes_after
        ),
        None => println!("empty tree, left unchanged"),
    }

    let outputs = pass.into_sink();
    if let (Some(path), Some(octree)) = (&args.output, &outputs.octree) {
        fs::write(path, octree.to_bytes()?).with_context(|| format!("writing {}", path.display()))?;
    }

    if let (Some(path), Some(image)) = (&args.height_map, &outputs.image) {
        write_height_map(path, image, message.resolution as f32)?;
    }

    Ok(())
}

#[cfg(feature = "image")]
fn write_height_map(path: &Path, image: &HeightImage, resolution: f32) -> anyhow::Result<()> {
    image
        .to_height_map(resolution)?
        .to_image()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(not(feature = "image"))]
fn write_height_map(_: &Path, _: &HeightImage, _: f32) -> anyhow::Result<()> {
    anyhow::bail!("writing PNG height maps requires the `image` feature")
}
