use std::path::Path;

use clap::{CommandFactory, FromArgMatches};
use log::info;
use os_str_bytes::OsStrBytesExt;
use rand::random;
use took::Timer;

use relatedness_lns::cli::ProgramArguments;
use relatedness_lns::config::OperatorConfig;
use relatedness_lns::harness::{Harness, TourSettings};
use relatedness_lns::lns::destroy::RelatednessRemoval;
use relatedness_lns::lns::repair::InsertionOrder;
use relatedness_lns::problem::generator::generate_instance;
use relatedness_lns::utils::create_seeded_rng;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )?;
    let args = ProgramArguments::from_arg_matches(
        &ProgramArguments::command().get_matches_from(
            args.iter()
                .flat_map(|it| it.split(" ").into_iter().collect::<Vec<_>>()),
        ),
    )?;
    info!("{:?}", &args);

    let (seed_value, mut rng) = {
        let seed_value = args.seed.unwrap_or_else(|| random::<i128>().abs());
        info!("seed: {}", seed_value);
        (seed_value, create_seeded_rng(seed_value))
    };

    let config = match &args.config {
        Some(path) => OperatorConfig::read(path)?,
        None => OperatorConfig::default(),
    };

    let load_timer = Timer::new();
    let context = generate_instance(&args.instance.generator_settings(), &mut rng)?;
    info!(
        "generated {:?} instance with {} customers after {}",
        context.variant(),
        context.customer_count(),
        load_timer.took()
    );

    let mut destroy = config.destroy_parameters()?;
    let mut repair = config.repair_parameters(context.variant())?;
    args.overrides.apply(&mut destroy, &mut repair);
    destroy.validate()?;
    info!("destroy parameters: {:?}", &destroy);
    info!("repair parameters: {:?}", &repair);

    let harness = Harness::new(
        &context,
        RelatednessRemoval::new(destroy),
        InsertionOrder::new(repair),
        TourSettings {
            capacity: args.harness.capacity,
            skip_probability: args.harness.skip_probability,
        },
        args.harness.iterations,
    );
    let summary = harness.run(seed_value, args.harness.trajectories)?;

    if args.print_summary_to_stdout {
        println!("{}", summary.csv_line());
    }
    if let Some(path) = &args.summary_file {
        summary.write_json(Path::new(path))?;
        info!("summary written to {}", path);
    }
    Ok(())
}
