/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// data_management module
//
// functions to read model parameters and manage output directories
//
////////////////////////////////////////////////////////////////////////////////////

use std::fs;
use std::fs::File;
use std::io::prelude::Read;
use std::path::PathBuf;
use yaml_rust::yaml;
use yaml_rust::yaml::Yaml;

use crate::disease::DiseaseParms;
use crate::model::{PolicyThresholds, Scenario};
use crate::population::PopulationParms;

// Everything parms.yaml describes: one disease, one population, one
// scenario, and the list of seeds to run it with
pub struct ModelParameters {
    pub model_name: String,
    pub model_description: String,
    pub random_seeds: Vec<u64>,
    pub scenario: Scenario,
    pub thresholds: PolicyThresholds,
    pub disease: DiseaseParms,
    pub population: PopulationParms,
}

impl ModelParameters {
    pub fn to_string(&self) -> String {
        format!(
            "Model name {}\nModel description {}\nPopulation {}\nDisease duration {} days\nRuns {:?}",
            self.model_name,
            self.model_description,
            self.population.n_total,
            self.disease.max_duration,
            self.random_seeds
        )
    }
}

// -------------------------------- File paths -------------------------------------------------------------
pub struct ModelDataStore {
    parameter_file: PathBuf,
    run_dir: PathBuf,
}

impl ModelDataStore {
    // create file paths starting at model_root
    // panic if the root or the parameter file cannot be used
    // recreate the run output directory
    pub fn new(model_root: &str) -> ModelDataStore {
        let parameter_file: PathBuf = [model_root, "parms.yaml"].iter().collect();
        let run_dir: PathBuf = [model_root, "Runs"].iter().collect();

        // create the run directory - delete first if it exists
        if run_dir.exists() {
            match fs::remove_dir_all(&run_dir) {
                Ok(_) => (),
                Err(msg) => panic!(
                    "Could not delete pre-existing run directory {} - {}",
                    &run_dir.display(),
                    msg
                ),
            }
        }
        match fs::create_dir_all(&run_dir) {
            Ok(_) => (),
            Err(msg) => panic!(
                "Could not create run directory {} - {}",
                &run_dir.display(),
                msg
            ),
        }

        ModelDataStore {
            parameter_file,
            run_dir,
        }
    }

    pub fn get_model_parms(&self) -> ModelParameters {
        let mut parm_file = match File::open(self.parameter_file.as_path()) {
            Ok(f) => f,
            Err(msg) => panic!(
                "Cannot open parm file {} - {}",
                self.parameter_file.display(),
                msg
            ),
        };

        let mut parm_string = String::new();
        parm_file.read_to_string(&mut parm_string).unwrap();

        // the loader creates an array of yaml enums
        let docs = match yaml::YamlLoader::load_from_str(&parm_string) {
            Ok(docs_vec) => docs_vec,
            Err(msg) => panic!("Error parsing parameter file - {}", msg),
        };

        // there can be multiple docs in a yaml file.  Only the first one
        // interests us.
        let doc = &docs[0];

        let model_name = doc["model_name"].as_str().unwrap_or("unnamed").to_string();
        let model_description = doc["model_description"].as_str().unwrap_or("").to_string();

        // parse - scenario parms --------------------------------------------------
        let sc = &doc["scenario_parms"];
        let random_seeds: Vec<u64> = sc["random_seeds"]
            .as_vec()
            .expect("YAML - expected 'random_seeds' list")
            .iter()
            .map(|v| get_i64(v, "random_seeds entry") as u64)
            .collect();
        let scenario = Scenario {
            t_initial: get_i64(&sc["start_day"], "start_day"),
            n_initial: get_i64(&sc["initial_infections"], "initial_infections") as u64,
            t_vaccine: get_i64(&sc["vaccine_day"], "vaccine_day"),
            t_max: get_i64(&sc["max_days"], "max_days"),
            random_seed: 0, // overwritten per run
            cost_per_death: get_f64(&sc["cost_per_death"], "cost_per_death"),
        };

        // parse - policy thresholds -----------------------------------------------
        let pt = &doc["policy_parms"];
        let thresholds = PolicyThresholds {
            dist_home_symp_above: get_f64(&pt["dist_home_symp_above"], "dist_home_symp_above"),
            dist_recommend_above: get_f64(&pt["dist_recommend_above"], "dist_recommend_above"),
            dist_home_all_above: get_f64(&pt["dist_home_all_above"], "dist_home_all_above"),
        };

        // parse - disease parms ---------------------------------------------------
        let dp = &doc["disease_parms"];
        let disease = DiseaseParms {
            max_duration: get_i64(&dp["max_duration"], "max_duration") as usize,
            asymp_trans_reduction: get_f64(&dp["asymp_trans_reduction"], "asymp_trans_reduction"),
            false_neg_reduction: get_f64(&dp["false_neg_reduction"], "false_neg_reduction"),
            hosp_death_reduction: get_f64(&dp["hosp_death_reduction"], "hosp_death_reduction"),
            p_transmit: get_f64_vec(&dp["p_transmit"], "p_transmit"),
            p_symptoms: get_f64_vec(&dp["p_symptoms"], "p_symptoms"),
            p_negative: get_f64_vec(&dp["p_negative"], "p_negative"),
            p_recovery: get_f64_vec(&dp["p_recovery"], "p_recovery"),
            p_critical: get_f64_vec(&dp["p_critical"], "p_critical"),
            p_death: get_f64_vec(&dp["p_death"], "p_death"),
        };

        // parse - population parms ------------------------------------------------
        let pp = &doc["population_parms"];
        let population = PopulationParms {
            n_total: get_i64(&pp["n_total"], "n_total") as u64,
            n_hospital_beds: get_i64(&pp["n_hospital_beds"], "n_hospital_beds") as u64,
            cr_normal: get_f64(&pp["cr_normal"], "cr_normal"),
            cr_home: get_f64(&pp["cr_home"], "cr_home"),
            cr_hospital: get_f64(&pp["cr_hospital"], "cr_hospital"),
            daily_production: get_f64(&pp["daily_production"], "daily_production"),
            f_critical_jobs: get_f64(&pp["f_critical_jobs"], "f_critical_jobs"),
            prod_symp: get_f64(&pp["prod_symp"], "prod_symp"),
            prod_dist: get_f64(&pp["prod_dist"], "prod_dist"),
            prod_home: get_f64(&pp["prod_home"], "prod_home"),
            daily_vaccination_capacity: get_f64(
                &pp["daily_vaccination_capacity"],
                "daily_vaccination_capacity",
            ),
        };

        ModelParameters {
            model_name,
            model_description,
            random_seeds,
            scenario,
            thresholds,
            disease,
            population,
        }
    }

    // create the output directory for one run and return its path
    pub fn create_run_directory(&self, run_number: usize) -> String {
        let dir_path = PathBuf::from(format!("run_{:04}", run_number));
        let dir_full_path: PathBuf = [&self.run_dir, &dir_path].iter().collect();
        if !dir_full_path.exists() {
            match fs::create_dir(&dir_full_path) {
                Ok(_) => (),
                Err(msg) => panic!(
                    "Could not create run directory {} - {}",
                    &dir_full_path.display(),
                    msg
                ),
            }
        }
        dir_full_path.display().to_string()
    }
}

// yaml-rust keeps integers and reals apart; model files use both freely
fn get_f64(value: &Yaml, name: &str) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_i64().map(|v| v as f64))
        .unwrap_or_else(|| panic!("YAML - expected numeric parameter '{}'", name))
}

fn get_i64(value: &Yaml, name: &str) -> i64 {
    value
        .as_i64()
        .unwrap_or_else(|| panic!("YAML - expected integer parameter '{}'", name))
}

fn get_f64_vec(value: &Yaml, name: &str) -> Vec<f64> {
    value
        .as_vec()
        .unwrap_or_else(|| panic!("YAML - expected list parameter '{}'", name))
        .iter()
        .map(|v| get_f64(v, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::yaml::YamlLoader;

    #[test]
    fn numeric_helpers_accept_integers_and_reals() {
        let docs = YamlLoader::load_from_str("a: 3\nb: 0.25\nc: [0, 0.5, 1]").unwrap();
        let doc = &docs[0];
        assert_eq!(get_i64(&doc["a"], "a"), 3);
        assert_eq!(get_f64(&doc["a"], "a"), 3.0);
        assert_eq!(get_f64(&doc["b"], "b"), 0.25);
        assert_eq!(get_f64_vec(&doc["c"], "c"), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    #[should_panic(expected = "expected numeric parameter")]
    fn missing_parameter_panics_with_its_name() {
        let docs = YamlLoader::load_from_str("a: 3").unwrap();
        get_f64(&docs[0]["missing"], "missing");
    }
}
