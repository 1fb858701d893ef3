/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// population module
//
// owns the day-binned infection state and the per-day transition algorithm.
// Each simulated day every active cohort advances one day since infection,
// with recoveries, worsenings and deaths drawn from the sampling module,
// and a new day-0 cohort drawn from the contact-weighted infection rate.
//
////////////////////////////////////////////////////////////////////////////////////

use rand::Rng;

use crate::disease::Disease;
use crate::errors::EpiError;
use crate::sampling::{draw_binomial, draw_binomial_split};

// Disease control measures currently in force for this population
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Policy {
    // Is social distancing recommended?
    pub dist_recommend: bool,
    // Are stay-at-home orders active for people with symptoms?
    pub dist_home_symp: bool,
    // Are stay-at-home orders active for everyone?
    pub dist_home_all: bool,
}

// Unvalidated population input, as read from the model data file
#[derive(Debug, Clone, Default)]
pub struct PopulationParms {
    pub n_total: u64,
    pub n_hospital_beds: u64,

    // Baseline contact rates for various situations
    pub cr_normal: f64,
    pub cr_home: f64,
    pub cr_hospital: f64,

    // Economic model
    pub daily_production: f64, // average production per person per day
    pub f_critical_jobs: f64,  // fraction exempt from stay-at-home orders
    pub prod_symp: f64,        // productivity impact of mild illness
    pub prod_dist: f64,        // productivity impact of social distancing
    pub prod_home: f64,        // productivity impact of home quarantine

    // Fraction of the total population that can be vaccinated each day,
    // once a vaccine exists
    pub daily_vaccination_capacity: f64,
}

// One population's epidemic state.  The four vectors are parallel series
// indexed by days since infection; every bin's total equals the sum of its
// three sub-categories, and the scalar counters partition n_total.
#[derive(Debug, Clone)]
pub struct Population {
    policy: Policy,

    cr_normal: f64,
    cr_home: f64,
    cr_hospital: f64,

    daily_production: f64,
    f_critical_jobs: f64,
    prod_symp: f64,
    prod_dist: f64,
    prod_home: f64,

    daily_vaccination_capacity: f64,

    n_total: u64,
    n_susceptible: u64,
    n_infected: u64,
    n_recovered: u64,
    n_vaccinated: u64,
    n_dead: u64,
    n_dead_last: u64,
    n_total_critical: u64,
    n_hospital_beds: u64,

    // Active infections binned by day post infection
    max_duration: usize,
    n_total_active: Vec<u64>,
    n_asymptomatic: Vec<u64>,
    n_symptomatic: Vec<u64>,
    n_critical: Vec<u64>,
}

impl Population {
    // Create a fully susceptible population with empty infection bins
    pub fn new(parms: &PopulationParms, max_duration: usize) -> Result<Population, EpiError> {
        if max_duration == 0 {
            return Err(EpiError::InvalidArgs);
        }

        let fractions = [
            parms.f_critical_jobs,
            parms.prod_symp,
            parms.prod_dist,
            parms.prod_home,
            parms.daily_vaccination_capacity,
        ];
        if fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(EpiError::InvalidData);
        }

        let rates = [
            parms.cr_normal,
            parms.cr_home,
            parms.cr_hospital,
            parms.daily_production,
        ];
        if rates.iter().any(|r| !(*r >= 0.0) || !r.is_finite()) {
            return Err(EpiError::InvalidData);
        }

        Ok(Population {
            policy: Policy::default(),
            cr_normal: parms.cr_normal,
            cr_home: parms.cr_home,
            cr_hospital: parms.cr_hospital,
            daily_production: parms.daily_production,
            f_critical_jobs: parms.f_critical_jobs,
            prod_symp: parms.prod_symp,
            prod_dist: parms.prod_dist,
            prod_home: parms.prod_home,
            daily_vaccination_capacity: parms.daily_vaccination_capacity,
            n_total: parms.n_total,
            n_susceptible: parms.n_total,
            n_infected: 0,
            n_recovered: 0,
            n_vaccinated: 0,
            n_dead: 0,
            n_dead_last: 0,
            n_total_critical: 0,
            n_hospital_beds: parms.n_hospital_beds,
            max_duration,
            n_total_active: vec![0; max_duration],
            n_asymptomatic: vec![0; max_duration],
            n_symptomatic: vec![0; max_duration],
            n_critical: vec![0; max_duration],
        })
    }

    // Infect members of the population, placed in the day-0 bin as
    // asymptomatic cases.  If the requested count exceeds the susceptible
    // population, the entire susceptible population becomes infected.
    pub fn seed_infections(&mut self, n_cases: u64) {
        let n_cases = n_cases.min(self.n_susceptible);
        self.n_susceptible -= n_cases;
        self.n_infected += n_cases;
        self.n_total_active[0] += n_cases;
        self.n_asymptomatic[0] += n_cases;
    }

    // Evolve the population forward by one day
    pub fn evolve_one_day<R: Rng>(
        &mut self,
        rng: &mut R,
        disease: &Disease,
        vaccine_available: bool,
    ) -> Result<(), EpiError> {
        if disease.max_duration() != self.max_duration {
            return Err(EpiError::InvalidArgs);
        }

        self.n_dead_last = self.n_dead;

        if vaccine_available {
            let capacity = (self.daily_vaccination_capacity * self.n_total as f64) as u64;
            let n_vac = capacity.min(self.n_susceptible);
            self.n_susceptible -= n_vac;
            self.n_vaccinated += n_vac;
        }

        // Death rate modifier based on availability of hospital beds
        let hr = self.calc_hosp_rate();
        let death_reduction = (1.0 - hr) + hr * disease.hosp_death_reduction();

        // Everyone who reaches max_duration recovers rather than
        // transitioning further.  The bin is cleared immediately: the shift
        // loop below only ever writes it, and when the loop is skipped
        // because nobody is left infected, stale counts must not linger.
        let last = self.max_duration - 1;
        self.n_recovered += self.n_total_active[last];
        self.n_infected -= self.n_total_active[last];
        self.n_total_active[last] = 0;
        self.n_asymptomatic[last] = 0;
        self.n_symptomatic[last] = 0;
        self.n_critical[last] = 0;

        // Advance disease time and change category counts, oldest bin
        // first so that bin i is written from bin i-1 before i-1 itself
        // is overwritten
        if self.n_infected > 0 {
            for i in (1..self.max_duration).rev() {
                let n_t = self.n_total_active[i - 1];
                let n_a = self.n_asymptomatic[i - 1];
                let n_s = self.n_symptomatic[i - 1];
                let n_c = self.n_critical[i - 1];

                let p_r = disease.p_recovery()[i - 1];
                let p_s = disease.p_symptoms()[i - 1];
                let p_c = disease.p_critical()[i - 1];
                let p_d = disease.p_death()[i - 1] * death_reduction;

                // Each cohort splits between recovery and its own way of
                // getting worse: asymptomatic cases develop symptoms,
                // symptomatic cases turn critical, critical cases die
                let (r_a, w_a) = draw_binomial_split(rng, p_r, p_s, n_a)?;
                let (r_s, w_s) = draw_binomial_split(rng, p_r, p_c, n_s)?;
                let (r_c, w_c) = draw_binomial_split(rng, p_r, p_d, n_c)?;

                self.n_total_active[i] = n_t - r_a - r_s - r_c - w_c;
                self.n_asymptomatic[i] = n_a - r_a - w_a;
                self.n_symptomatic[i] = n_s + w_a - r_s - w_s;
                self.n_critical[i] = n_c + w_s - r_c - w_c;

                self.n_dead += w_c;
                self.n_recovered += r_a + r_s + r_c;
                self.n_infected -= r_a + r_s + r_c + w_c;

                // Conservation by time bin.  A failure here means the
                // sampling arithmetic is buggy, not that the input is bad.
                assert_eq!(
                    self.n_total_active[i],
                    self.n_asymptomatic[i] + self.n_symptomatic[i] + self.n_critical[i],
                    "bin {} lost conservation",
                    i
                );
            }
        }

        // Day 0 bin: nobody is at day 0 until the new infections land
        self.n_total_active[0] = 0;
        self.n_asymptomatic[0] = 0;
        self.n_symptomatic[0] = 0;
        self.n_critical[0] = 0;

        if self.n_susceptible > 0 {
            let infection_rate = self.calc_infection_rate(disease);
            let p = (infection_rate / self.n_susceptible as f64).min(1.0);
            let n_new = draw_binomial(rng, p, self.n_susceptible)?;
            self.seed_infections(n_new);
        }

        self.n_total_critical = self.n_critical.iter().sum();

        // Conservation across the entire population
        assert_eq!(
            self.n_total,
            self.n_susceptible + self.n_infected + self.n_recovered + self.n_dead
                + self.n_vaccinated,
            "population lost conservation"
        );
        assert_eq!(
            self.n_infected,
            self.n_total_active.iter().sum::<u64>(),
            "infected counter out of sync with day bins"
        );

        Ok(())
    }

    // Contact-weighted force of infection: the mean number of new
    // infections expected today, given current policy and hospital load
    fn calc_infection_rate(&self, disease: &Disease) -> f64 {
        // Weights for how often asymptomatic, symptomatic and critical
        // people come into contact with others.  1 is the baseline rate
        // corresponding to the disease table's transmission probabilities.
        let mut wa = self.cr_normal;
        let mut ws = 0.5 * (self.cr_normal + self.cr_home);
        let mut wc = self.cr_home;
        let wh = self.cr_hospital;

        let fcj = self.f_critical_jobs;

        if self.policy.dist_home_all {
            // People without critical jobs stay at home, and even those
            // with critical jobs spend more time at home than usual
            wa = self.cr_home * (1.0 - fcj) + 0.5 * (self.cr_normal + self.cr_home) * fcj;
            ws = self.cr_home;
        } else {
            if self.policy.dist_home_symp {
                ws = self.cr_home;
            }
            if self.policy.dist_recommend {
                wa = 0.5 * (self.cr_normal + self.cr_home);
            }
        }

        // Critical cases in hospital contact people at the hospital rate
        let hr = self.calc_hosp_rate();
        wc = hr * wh + (1.0 - hr) * wc;

        // Estimated contact volume for the entire population
        let mut cr = wa * self.n_susceptible as f64 + wa * self.n_recovered as f64;
        for i in 0..self.max_duration {
            cr += wa * self.n_asymptomatic[i] as f64
                + ws * self.n_symptomatic[i] as f64
                + wc * self.n_critical[i] as f64;
        }
        if cr <= 0.0 {
            return 0.0;
        }

        // Fraction of contacts that are susceptible
        let fs = wa * self.n_susceptible as f64 / cr;

        let mut inf_rate = 0.0;
        for i in 0..self.max_duration {
            // Contacts made by people on day i of the disease
            let ci = wa * disease.asymp_trans_reduction() * self.n_asymptomatic[i] as f64
                + ws * self.n_symptomatic[i] as f64
                + wc * self.n_critical[i] as f64;
            inf_rate += disease.p_transmit()[i] * ci;
        }
        inf_rate * fs
    }

    // Fraction of critical cases that can be hospitalized
    fn calc_hosp_rate(&self) -> f64 {
        if self.n_hospital_beds == 0 {
            return 0.0;
        }
        if self.n_hospital_beds >= self.n_infected {
            return 1.0;
        }
        let load = self.hospital_load();
        if load < 1.0 {
            1.0
        } else {
            1.0 / load
        }
    }

    // Ratio of critical cases to hospital capacity.  Infinite if the
    // population has no hospital beds; callers must guard.
    pub fn hospital_load(&self) -> f64 {
        let n_crit: u64 = self.n_critical.iter().sum();
        n_crit as f64 / self.n_hospital_beds as f64
    }

    // Production lost today, in the same units as daily_production
    pub fn productivity_loss(&self) -> f64 {
        // People who are dead or in critical condition lose all production
        let n_crit: u64 = self.n_critical.iter().sum();
        let n_incap = self.n_dead + n_crit;
        let mut result = n_incap as f64;

        // Symptomatic but not critical people lose part of their
        // production, depending on policy
        let n_symp: u64 = self.n_symptomatic.iter().sum();
        let ps = if self.policy.dist_home_symp {
            self.prod_home * self.prod_symp
        } else {
            0.5 * (1.0 + self.prod_home) * self.prod_symp
        };
        result += n_symp as f64 * (1.0 - ps);

        // Everyone else produces at a policy-dependent rate
        let n_rest = self.n_total - n_incap - n_symp;
        let pa = if self.policy.dist_home_all {
            self.f_critical_jobs + self.prod_home * (1.0 - self.f_critical_jobs)
        } else if self.policy.dist_recommend {
            self.f_critical_jobs + self.prod_dist * (1.0 - self.f_critical_jobs)
        } else {
            1.0
        };
        result += n_rest as f64 * (1.0 - pa);

        result * self.daily_production
    }

    // Control measure: add hospital beds to the population
    pub fn add_hospital_capacity(&mut self, n_beds: u64) {
        self.n_hospital_beds += n_beds;
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }
    pub fn max_duration(&self) -> usize {
        self.max_duration
    }
    pub fn n_total(&self) -> u64 {
        self.n_total
    }
    pub fn n_susceptible(&self) -> u64 {
        self.n_susceptible
    }
    pub fn n_infected(&self) -> u64 {
        self.n_infected
    }
    pub fn n_recovered(&self) -> u64 {
        self.n_recovered
    }
    pub fn n_vaccinated(&self) -> u64 {
        self.n_vaccinated
    }
    pub fn n_dead(&self) -> u64 {
        self.n_dead
    }
    pub fn n_dead_last(&self) -> u64 {
        self.n_dead_last
    }
    pub fn n_total_critical(&self) -> u64 {
        self.n_total_critical
    }
    pub fn n_hospital_beds(&self) -> u64 {
        self.n_hospital_beds
    }
    pub fn n_total_active(&self) -> &[u64] {
        &self.n_total_active
    }
    pub fn n_asymptomatic(&self) -> &[u64] {
        &self.n_asymptomatic
    }
    pub fn n_symptomatic(&self) -> &[u64] {
        &self.n_symptomatic
    }
    pub fn n_critical(&self) -> &[u64] {
        &self.n_critical
    }
}
