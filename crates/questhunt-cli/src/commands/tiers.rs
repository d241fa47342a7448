use questhunt_core::{Config, TIERS};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&TIERS)?);
        return Ok(());
    }

    let base_ms = Config::load_or_default().feedback.cadence_base_ms;
    println!("{:<12} {:>8}  {:<8} {:>5} {:>4} {:>9}", "TIER", "FROM", "COLOR", "PULSE", "BIP", "CUE");
    for tier in TIERS.iter() {
        let cue = tier
            .cue_period_ms(base_ms)
            .map(|ms| format!("{ms} ms"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:>6} m  {:<8} {:>5} {:>4} {:>9}",
            tier.name, tier.min_distance_m, tier.color, tier.pulse_intensity, tier.bip_rate, cue
        );
    }
    Ok(())
}
