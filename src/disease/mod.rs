/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// disease module
//
// the immutable disease progression table: per-day-since-infection
// probabilities consumed by the population evolution engine
//
////////////////////////////////////////////////////////////////////////////////////

use crate::errors::EpiError;

// Everything a disease does to a cohort on day i of infection, as
// probabilities.  Validated once at construction; after that consumers can
// index the arrays freely up to max_duration.
#[derive(Debug, Clone)]
pub struct Disease {
    // Maximum duration before forced recovery, in days
    max_duration: usize,

    // How much is transmission probability reduced for asymptomatic cases?
    asymp_trans_reduction: f64,
    // How much is the chance of a false negative reduced if symptoms
    // are present?  (Unused until a testing sub-model exists.)
    false_neg_reduction: f64,
    // How much is the death rate reduced when a critical case is
    // hospitalized?
    hosp_death_reduction: f64,

    // Disease progression: probabilities per day since infection
    p_transmit: Vec<f64>, // transmission on contact
    p_symptoms: Vec<f64>, // asymptomatic case develops symptoms
    p_negative: Vec<f64>, // false negative test, if no symptoms (unused)
    p_recovery: Vec<f64>, // recovery on this day
    p_critical: Vec<f64>, // symptomatic case becomes critical
    p_death: Vec<f64>,    // critical case dies, before hospital adjustment
}

// Unvalidated input for a Disease, as read from the model data file
#[derive(Debug, Clone, Default)]
pub struct DiseaseParms {
    pub max_duration: usize,
    pub asymp_trans_reduction: f64,
    pub false_neg_reduction: f64,
    pub hosp_death_reduction: f64,
    pub p_transmit: Vec<f64>,
    pub p_symptoms: Vec<f64>,
    pub p_negative: Vec<f64>,
    pub p_recovery: Vec<f64>,
    pub p_critical: Vec<f64>,
    pub p_death: Vec<f64>,
}

impl Disease {
    pub fn new(parms: DiseaseParms) -> Result<Disease, EpiError> {
        if parms.max_duration == 0 {
            return Err(EpiError::InvalidData);
        }

        let arrays = [
            &parms.p_transmit,
            &parms.p_symptoms,
            &parms.p_negative,
            &parms.p_recovery,
            &parms.p_critical,
            &parms.p_death,
        ];
        for array in &arrays {
            if array.len() != parms.max_duration {
                return Err(EpiError::InvalidData);
            }
            if array.iter().any(|p| !(0.0..=1.0).contains(p)) {
                return Err(EpiError::InvalidData);
            }
        }

        let scalars = [
            parms.asymp_trans_reduction,
            parms.false_neg_reduction,
            parms.hosp_death_reduction,
        ];
        if scalars.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(EpiError::InvalidData);
        }

        Ok(Disease {
            max_duration: parms.max_duration,
            asymp_trans_reduction: parms.asymp_trans_reduction,
            false_neg_reduction: parms.false_neg_reduction,
            hosp_death_reduction: parms.hosp_death_reduction,
            p_transmit: parms.p_transmit,
            p_symptoms: parms.p_symptoms,
            p_negative: parms.p_negative,
            p_recovery: parms.p_recovery,
            p_critical: parms.p_critical,
            p_death: parms.p_death,
        })
    }

    pub fn max_duration(&self) -> usize {
        self.max_duration
    }
    pub fn asymp_trans_reduction(&self) -> f64 {
        self.asymp_trans_reduction
    }
    pub fn false_neg_reduction(&self) -> f64 {
        self.false_neg_reduction
    }
    pub fn hosp_death_reduction(&self) -> f64 {
        self.hosp_death_reduction
    }
    pub fn p_transmit(&self) -> &[f64] {
        &self.p_transmit
    }
    pub fn p_symptoms(&self) -> &[f64] {
        &self.p_symptoms
    }
    pub fn p_negative(&self) -> &[f64] {
        &self.p_negative
    }
    pub fn p_recovery(&self) -> &[f64] {
        &self.p_recovery
    }
    pub fn p_critical(&self) -> &[f64] {
        &self.p_critical
    }
    pub fn p_death(&self) -> &[f64] {
        &self.p_death
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_parms() -> DiseaseParms {
        DiseaseParms {
            max_duration: 4,
            asymp_trans_reduction: 0.5,
            false_neg_reduction: 0.2,
            hosp_death_reduction: 0.4,
            p_transmit: vec![0.1, 0.2, 0.2, 0.1],
            p_symptoms: vec![0.0, 0.1, 0.3, 0.3],
            p_negative: vec![0.9, 0.7, 0.5, 0.5],
            p_recovery: vec![0.0, 0.0, 0.2, 0.5],
            p_critical: vec![0.0, 0.05, 0.1, 0.1],
            p_death: vec![0.0, 0.1, 0.2, 0.3],
        }
    }

    #[test]
    fn valid_table_is_accepted() {
        let disease = Disease::new(valid_parms()).unwrap();
        assert_eq!(disease.max_duration(), 4);
        assert_eq!(disease.p_recovery()[3], 0.5);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut parms = valid_parms();
        parms.max_duration = 0;
        assert_eq!(Disease::new(parms).unwrap_err(), EpiError::InvalidData);
    }

    #[test]
    fn mismatched_array_length_is_rejected() {
        let mut parms = valid_parms();
        parms.p_death.pop();
        assert_eq!(Disease::new(parms).unwrap_err(), EpiError::InvalidData);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut parms = valid_parms();
        parms.p_transmit[1] = 1.2;
        assert_eq!(
            Disease::new(parms).unwrap_err(),
            EpiError::InvalidData
        );

        let mut parms = valid_parms();
        parms.hosp_death_reduction = -0.1;
        assert_eq!(Disease::new(parms).unwrap_err(), EpiError::InvalidData);
    }
}
