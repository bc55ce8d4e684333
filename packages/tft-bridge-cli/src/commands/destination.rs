//! `tft-bridge check-destination`

use eyre::Result;
use tft_bridge::withdraw::validate_destination;

use super::horizon_settings;
use crate::cli::CheckDestinationArgs;

pub async fn run(args: CheckDestinationArgs) -> Result<()> {
    let (horizon, asset) = horizon_settings(&args.horizon)?;
    let address = validate_destination(&args.stellar_address, &horizon, &asset).await?;

    println!(
        "{} exists and trusts {}:{}",
        address.as_str(),
        asset.code,
        asset.issuer
    );
    Ok(())
}
