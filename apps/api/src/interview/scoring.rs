//! Score aggregation: session-level averages over per-answer evaluations.

use serde::Serialize;

use crate::interview::models::{clamp_score, Evaluation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreAverages {
    pub avg_technical: f64,
    pub avg_communication: f64,
    pub avg_confidence: f64,
    pub avg_relevance: f64,
}

impl ScoreAverages {
    /// Communication average as a bounded integer score.
    pub fn communication_score(&self) -> u8 {
        clamp_score(self.avg_communication.round() as i64)
    }

    /// Behavioral score is carried by the confidence average.
    pub fn behavioral_score(&self) -> u8 {
        clamp_score(self.avg_confidence.round() as i64)
    }
}

/// Arithmetic mean of each score. All zero for an empty slice.
pub fn aggregate(evaluations: &[Evaluation]) -> ScoreAverages {
    if evaluations.is_empty() {
        return ScoreAverages::default();
    }

    let n = evaluations.len() as f64;
    let mean = |f: fn(&Evaluation) -> u8| evaluations.iter().map(|e| f(e) as f64).sum::<f64>() / n;

    ScoreAverages {
        avg_technical: mean(|e| e.technical),
        avg_communication: mean(|e| e.communication),
        avg_confidence: mean(|e| e.confidence),
        avg_relevance: mean(|e| e.relevance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_empty_is_all_zero() {
        let averages = aggregate(&[]);
        assert_eq!(averages, ScoreAverages::default());
        assert_eq!(averages.communication_score(), 0);
    }

    #[test]
    fn test_aggregate_two_evaluations() {
        let evals = vec![
            Evaluation::bounded(80, 90, 70, 60, "a"),
            Evaluation::bounded(60, 70, 50, 100, "b"),
        ];
        let averages = aggregate(&evals);
        assert_eq!(averages.avg_technical, 70.0);
        assert_eq!(averages.avg_communication, 80.0);
        assert_eq!(averages.avg_confidence, 60.0);
        assert_eq!(averages.avg_relevance, 80.0);
    }

    #[test]
    fn test_fractional_average_rounds_for_integer_scores() {
        let evals = vec![
            Evaluation::bounded(0, 71, 65, 0, ""),
            Evaluation::bounded(0, 72, 66, 0, ""),
        ];
        let averages = aggregate(&evals);
        assert_eq!(averages.avg_communication, 71.5);
        assert_eq!(averages.communication_score(), 72);
        assert_eq!(averages.behavioral_score(), 66);
    }

    #[test]
    fn test_averages_serialize_with_avg_keys() {
        let averages = aggregate(&[Evaluation::bounded(80, 90, 70, 60, "a")]);
        let value = serde_json::to_value(averages).unwrap();
        assert_eq!(value["avg_technical"], 80.0);
        assert_eq!(value["avg_relevance"], 60.0);
    }
}
