use std::env;
use std::io::{self, Write};

use outbreak::data_management;
use outbreak::disease::Disease;
use outbreak::model::Model;
use outbreak::population::Population;
use outbreak::stats;

fn main() {
    // process command line arguments (for now just the model root directory location)
    let args: Vec<_> = env::args().collect();
    let model_root = if args.len() > 1 {
        &args[1]
    } else {
        panic! {"Error: no model location specified"}
    };

    // The model data store handles all model inputs and outputs
    let model_data_store = data_management::ModelDataStore::new(model_root);

    let model_parms = model_data_store.get_model_parms();
    println!("\n--------------------Outbreak Model-----------------------");
    println!("{}", model_parms.to_string());

    // loop around runs - same scenario, different random seed
    for (run_index, &seed) in model_parms.random_seeds.iter().enumerate() {
        let run_number = run_index + 1;
        println!(
            "\nStarting run {} (seed {}) ----------------------------------------------",
            run_number, seed
        );

        let run_dir_name = model_data_store.create_run_directory(run_number);
        let daily_log = stats::DailyLog::new(&run_dir_name);

        let disease = match Disease::new(model_parms.disease.clone()) {
            Ok(d) => d,
            Err(why) => panic!("Invalid disease table - {}", why),
        };
        let population = match Population::new(&model_parms.population, disease.max_duration()) {
            Ok(p) => p,
            Err(why) => panic!("Invalid population parameters - {}", why),
        };

        let mut scenario = model_parms.scenario.clone();
        scenario.random_seed = seed;
        let mut model = match Model::new(scenario, disease, population) {
            Ok(m) => m,
            Err(why) => panic!("Invalid scenario - {}", why),
        };

        // Loop around days until the scenario ends
        print!("Running");
        let mut records: Vec<stats::DailyRecord> = Vec::new();
        while !model.finished() {
            // today's control measures follow yesterday's hospital load
            let load = if model.population().n_hospital_beds() > 0 {
                model.population().hospital_load()
            } else {
                0.0
            };
            let policy = model_parms.thresholds.policy_for(load);

            if let Err(why) = model.step(&policy) {
                panic!("Model step failed on day {} - {}", model.day(), why);
            }
            records.push(stats::DailyRecord::new(
                &model.observables(),
                model.population(),
            ));

            if model.day() % 10 == 0 {
                print!(".");
                io::stdout().flush().unwrap();
            }
        }

        println!();
        print!("Logging {} days of output ... ", records.len());
        io::stdout().flush().unwrap();
        daily_log.append(&records);
        println!("done");

        let out = model.observables();
        println!(
            "Run {} finished on day {}: {} dead, {} recovered, {} vaccinated, {} never infected",
            run_number, out.day, out.n_dead, out.n_recovered, out.n_vaccinated, out.n_susceptible
        );
    }
}
