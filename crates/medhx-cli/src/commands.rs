use anyhow::Result;
use medhx_cli::inspect::{inspect_response, inspect_verification};
use medhx_cli::load::{LoadOptions, LoadOutcome, run_load};
use medhx_load::Facility;

use crate::cli::{InspectCommand, LoadArgs};
use crate::summary::{print_response, print_verification};

pub fn run_inspect(command: &InspectCommand) -> Result<()> {
    match command {
        InspectCommand::Verification(args) => {
            let inspection = inspect_verification(&args.file, args.load.as_deref())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                print_verification(&inspection);
            }
        }
        InspectCommand::Response(args) => {
            let inspection = inspect_response(&args.file, args.lenient)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                print_response(&inspection);
            }
        }
    }
    Ok(())
}

pub fn run_load_command(args: &LoadArgs) -> Result<LoadOutcome> {
    run_load(&LoadOptions {
        config: args.config.clone(),
        patients: args.patients.clone(),
        out_dir: args.out_dir.clone(),
        facility: Facility {
            id: args.facility.clone(),
            npi: args.npi.clone(),
        },
        customer_id: args.customer.clone().unwrap_or_else(|| args.facility.clone()),
        population_id: args.population.clone(),
    })
}
