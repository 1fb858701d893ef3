// End-to-end run of a full scenario: epidemic takes off, policy reacts to
// hospital load, vaccine arrives, and the run terminates with every person
// accounted for.

use outbreak::disease::{Disease, DiseaseParms};
use outbreak::model::{Model, PolicyThresholds, Scenario};
use outbreak::population::{Population, PopulationParms};
use outbreak::stats::{DailyLog, DailyRecord};

const MAX_DURATION: usize = 14;

fn test_disease() -> Disease {
    // A fortnight-long illness: infectious through the middle stretch,
    // symptoms ramp up, recovery dominates the tail
    let ramp = |lo: f64, hi: f64| -> Vec<f64> {
        (0..MAX_DURATION)
            .map(|i| lo + (hi - lo) * i as f64 / (MAX_DURATION - 1) as f64)
            .collect()
    };
    Disease::new(DiseaseParms {
        max_duration: MAX_DURATION,
        asymp_trans_reduction: 0.5,
        false_neg_reduction: 0.3,
        hosp_death_reduction: 0.4,
        p_transmit: vec![0.0, 0.1, 0.3, 0.3, 0.3, 0.3, 0.2, 0.2, 0.1, 0.1, 0.05, 0.05, 0.0, 0.0],
        p_symptoms: ramp(0.0, 0.3),
        p_negative: ramp(0.5, 0.1),
        p_recovery: ramp(0.0, 0.5),
        p_critical: ramp(0.0, 0.1),
        p_death: ramp(0.0, 0.2),
    })
    .unwrap()
}

fn test_population() -> Population {
    Population::new(
        &PopulationParms {
            n_total: 2_000_000,
            n_hospital_beds: 2_000,
            cr_normal: 1.0,
            cr_home: 0.3,
            cr_hospital: 1.2,
            daily_production: 250.0,
            f_critical_jobs: 0.2,
            prod_symp: 0.7,
            prod_dist: 0.9,
            prod_home: 0.6,
            daily_vaccination_capacity: 0.01,
        },
        MAX_DURATION,
    )
    .unwrap()
}

fn test_scenario(seed: u64) -> Scenario {
    Scenario {
        t_initial: 0,
        n_initial: 100,
        t_vaccine: 100,
        t_max: 400,
        random_seed: seed,
        cost_per_death: 8e6,
    }
}

fn run_scenario(seed: u64) -> (Model, Vec<DailyRecord>) {
    let thresholds = PolicyThresholds {
        dist_home_symp_above: 0.0,
        dist_recommend_above: 0.32,
        dist_home_all_above: 0.82,
    };

    let mut model = Model::new(test_scenario(seed), test_disease(), test_population()).unwrap();
    let mut records = Vec::new();
    while !model.finished() {
        let policy = thresholds.policy_for(model.population().hospital_load());
        model.step(&policy).unwrap();
        records.push(DailyRecord::new(&model.observables(), model.population()));

        // Population conservation, every single day
        let pop = model.population();
        assert_eq!(
            pop.n_total(),
            pop.n_susceptible()
                + pop.n_infected()
                + pop.n_recovered()
                + pop.n_dead()
                + pop.n_vaccinated()
        );
    }
    (model, records)
}

#[test]
fn epidemic_runs_to_completion() {
    let (model, records) = run_scenario(12345);
    let out = model.observables();

    assert!(out.finished);
    assert!(out.vaccine_available);
    // The outbreak actually spread beyond the seed cases
    assert!(out.n_recovered + out.n_dead > 100);
    assert!(out.n_vaccinated > 0);
    assert!(!records.is_empty());

    // Cumulative counters never go backwards
    for pair in records.windows(2) {
        assert!(pair[1].dead >= pair[0].dead);
        assert!(pair[1].recovered >= pair[0].recovered);
        assert!(pair[1].vaccinated >= pair[0].vaccinated);
        assert!(pair[1].susceptible <= pair[0].susceptible);
    }
}

#[test]
fn identical_seeds_produce_identical_histories() {
    let (_, first) = run_scenario(777);
    let (_, second) = run_scenario(777);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.infected, b.infected);
        assert_eq!(a.dead, b.dead);
    }
}

#[test]
fn daily_log_round_trips_through_csv() {
    let (_, records) = run_scenario(42);

    let dir = tempfile::tempdir().unwrap();
    let log = DailyLog::new(dir.path().to_str().unwrap());
    log.append(&records);

    let contents = std::fs::read_to_string(dir.path().join("daily_log.csv")).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next().unwrap(),
        "day,susceptible,infected,critical,recovered,vaccinated,dead,hospital_load,productivity_loss,cost"
    );
    assert_eq!(lines.count(), records.len());
}
