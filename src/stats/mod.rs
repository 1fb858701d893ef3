/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// stats module
//
// writes the per-day output log for a run
//
////////////////////////////////////////////////////////////////////////////////////

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::prelude::Write;
use std::path::PathBuf;

use crate::model::Observable;
use crate::population::Population;

// One row of the daily log: the observable snapshot plus the two
// aggregate reductions over the population state
#[derive(Debug, Copy, Clone, Serialize)]
pub struct DailyRecord {
    pub day: u64,
    pub susceptible: u64,
    pub infected: u64,
    pub critical: u64,
    pub recovered: u64,
    pub vaccinated: u64,
    pub dead: u64,
    pub hospital_load: f64,
    pub productivity_loss: f64,
    pub cost: f64,
}

impl DailyRecord {
    pub fn new(out: &Observable, pop: &Population) -> DailyRecord {
        // hospital_load is undefined without beds; log 0 rather than inf
        let hospital_load = if pop.n_hospital_beds() > 0 {
            pop.hospital_load()
        } else {
            0.0
        };
        DailyRecord {
            day: out.day,
            susceptible: out.n_susceptible,
            infected: out.n_infected,
            critical: out.n_critical,
            recovered: out.n_recovered,
            vaccinated: out.n_vaccinated,
            dead: out.n_dead,
            hospital_load,
            productivity_loss: pop.productivity_loss(),
            cost: out.cost_function,
        }
    }

    fn header() -> &'static [u8] {
        b"day,susceptible,infected,critical,recovered,vaccinated,dead,hospital_load,productivity_loss,cost\n"
    }
}

pub struct DailyLog {
    file_path: PathBuf,
}

impl DailyLog {
    pub fn new(run_dir: &str) -> DailyLog {
        let file_path: PathBuf = [run_dir, "daily_log.csv"].iter().collect();
        let mut file = match File::create(&file_path) {
            Err(why) => panic!("Couldn't create {} - {}", file_path.display(), why),
            Ok(file) => file,
        };

        match file.write_all(DailyRecord::header()) {
            Err(why) => panic!("Couldn't write headers to {} - {}", file_path.display(), why),
            Ok(_) => (),
        }

        DailyLog { file_path }
    }

    pub fn append(&self, records: &[DailyRecord]) {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.file_path)
            .unwrap();
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

        for record in records {
            wtr.serialize(record).unwrap();
        }
        wtr.flush().unwrap();
    }
}
