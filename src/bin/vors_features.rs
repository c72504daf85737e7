// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::info;
use std::{env, error::Error};

use visual_odometry_rcnn::core::model::Config;
use visual_odometry_rcnn::misc::interop;
use visual_odometry_rcnn::misc::type_aliases::Vec6;

/// Number of LSTM units of the DeepVO recurrent layers.
const MEMORY_SIZE: usize = 1000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Vec<String> = env::args().collect();
    if let Err(error) = my_run(&args) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

const USAGE: &str = "Usage: ./vors_features height width frame_0.png frame_1.png [frame_2.png ...]";

fn my_run(args: &[String]) -> Result<(), Box<dyn Error>> {
    // Check that the arguments are correct.
    let valid_args = check_args(args)?;
    let (height, width) = (valid_args.height, valid_args.width);

    // Stack consecutive frames two by two.
    let frames = interop::read_frames(&valid_args.frame_paths)?;
    let input = interop::stack_frames(&frames, height, width)?;
    let sequence_length = input.shape().sequence;
    info!("{} frame pairs of {}x{}", sequence_length, width, height);

    // Build the network and extract the features of the sequence.
    let image_shape = (height, width, interop::RGB_CHANNELS);
    let config = Config::deepvo(image_shape, MEMORY_SIZE, sequence_length, 1);
    let model = config.init()?;
    let features = model.cnn_output(&input, &[Vec6::zeros()], None)?;

    // Print to stdout the features shape and statistics.
    println!("features shape: {:?}", features.shape().dims());
    if let Some((mean, min, max)) = features.stats() {
        println!("mean: {}, min: {}, max: {}", mean, min, max);
    }
    Ok(())
}

struct Args {
    height: usize,
    width: usize,
    frame_paths: Vec<String>,
}

/// Verify that command line arguments are correct.
fn check_args(args: &[String]) -> Result<Args, String> {
    if let [_, height_str, width_str, frame_paths @ ..] = args {
        let height = parse_size(height_str)?;
        let width = parse_size(width_str)?;
        if frame_paths.len() < 2 {
            eprintln!("{}", USAGE);
            return Err("At least two frames are needed".to_string());
        }
        Ok(Args {
            height,
            width,
            frame_paths: frame_paths.to_vec(),
        })
    } else {
        eprintln!("{}", USAGE);
        Err("Wrong number of arguments".to_string())
    }
}

/// Parse a strictly positive image size.
fn parse_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => {
            eprintln!("{}", USAGE);
            Err(format!("Invalid image size: {}", s))
        }
    }
}
