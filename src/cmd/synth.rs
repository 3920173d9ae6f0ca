use clap::Args;
use runeforge::error::RfResult;
use runeforge::loader;
use runeforge::synthetic::{generate, SynthSpec};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    /// Output pool file.
    #[arg(short = 'o', long, default_value = "pools.json")]
    pub out: String,

    #[arg(long, default_value_t = 12)]
    pub weapons: usize,
    #[arg(long, default_value_t = 16)]
    pub armor: usize,
    #[arg(long, default_value_t = 8)]
    pub emblems: usize,
    #[arg(long, default_value_t = 12)]
    pub accessories: usize,

    #[arg(short = 'S', long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run(args: SynthArgs) -> RfResult<()> {
    let spec = SynthSpec {
        weapons: args.weapons,
        armor: args.armor,
        emblems: args.emblems,
        accessories: args.accessories,
        seed: args.seed,
    };
    let pools = generate(&spec);
    loader::save_pools(&args.out, &pools)?;
    info!("💾 Wrote {} synthetic items to {}", pools.len(), args.out);
    Ok(())
}
