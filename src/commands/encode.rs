use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::vision;

#[derive(Debug, Args, Clone)]
pub struct EncodeImageArgs {
    pub path: PathBuf,
    /// Wrap the payload in a `data:` URL.
    #[arg(long)]
    pub data_url: bool,
    /// Re-encode the image as PNG first.
    #[arg(long)]
    pub png: bool,
}

fn read_error(path: &Path, err: impl Display) -> String {
    format!("Failed to read image '{}': {err}", path.display())
}

pub fn run(args: EncodeImageArgs) -> Result<(), String> {
    let path = args.path.as_path();

    let output = if args.png {
        let bytes = fs::read(path).map_err(|err| read_error(path, err))?;
        let encoded = vision::encode_image_as_png(&bytes)
            .map_err(|err| format!("Failed to convert '{}' to PNG: {err}", path.display()))?;
        if args.data_url {
            format!("data:image/png;base64,{encoded}")
        } else {
            encoded
        }
    } else if args.data_url {
        vision::image_data_url(path).map_err(|err| read_error(path, err))?
    } else {
        vision::encode_image(path).map_err(|err| read_error(path, err))?
    };

    println!("{output}");
    Ok(())
}
