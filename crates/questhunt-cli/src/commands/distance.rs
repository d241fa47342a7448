use clap::Args;
use questhunt_core::geo::{cardinal, distance_and_bearing};
use questhunt_core::{classify, Coordinate};
use serde_json::json;

#[derive(Args)]
pub struct DistanceArgs {
    /// Start point as "lat,lon"
    #[arg(allow_hyphen_values = true)]
    pub from: Coordinate,
    /// End point as "lat,lon"
    #[arg(allow_hyphen_values = true)]
    pub to: Coordinate,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DistanceArgs) -> Result<(), Box<dyn std::error::Error>> {
    args.from.validate()?;
    args.to.validate()?;

    let (distance_m, bearing_deg) = distance_and_bearing(args.from, args.to);
    let tier = classify(distance_m);

    if args.json {
        let out = json!({
            "distance_m": distance_m,
            "bearing_deg": bearing_deg,
            "cardinal": cardinal(bearing_deg),
            "tier": tier.name,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("distance: {distance_m:.1} m");
        println!("bearing:  {bearing_deg:.0}° ({})", cardinal(bearing_deg));
        println!("tier:     {}", tier.name);
    }
    Ok(())
}
