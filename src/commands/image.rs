use anyhow::Result;

use crate::cli::{ImageArgs, ImageCommands};
use crate::cluster::{self, DEFAULT_NAME};

pub async fn cmd_image(args: ImageArgs) -> Result<()> {
    match args.cmd {
        ImageCommands::Load(args) => {
            let cluster = args.cluster.as_deref().unwrap_or(DEFAULT_NAME);
            cluster::load_image(&args.image, cluster).await
        }
    }
}
