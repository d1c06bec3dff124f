//! Model inference for position predictions

use log::{debug, warn};

use crate::data::ReferenceDataset;
use crate::features::{CategoryDictionary, FeatureSchema, FeatureVector, UnknownCategoryPolicy};
use crate::model::ModelArtifact;
use crate::{CategoryCode, Config, Prediction, RaceInputs, Result};

/// Predictor for race finishing positions.
///
/// Built once at startup from the reference dataset and the model artifact,
/// then passed by reference; dictionaries and model are read-only afterwards.
pub struct Predictor {
    model: ModelArtifact,
    drivers: CategoryDictionary,
    nationalities: CategoryDictionary,
    constructors: CategoryDictionary,
}

impl Predictor {
    /// Create a predictor from loaded parts.
    ///
    /// All three dictionaries share one unknown-category policy, so the
    /// choice is uniform across fields.
    pub fn new(
        model: ModelArtifact,
        reference: &ReferenceDataset,
        policy: UnknownCategoryPolicy,
    ) -> Result<Self> {
        let drivers =
            CategoryDictionary::from_values("driverRef", reference.driver_values(), policy)?;
        let nationalities =
            CategoryDictionary::from_values("nationality", reference.nationality_values(), policy)?;
        let constructors = CategoryDictionary::from_values(
            "constructorRef",
            reference.constructor_values(),
            policy,
        )?;

        if model.schema() != FeatureSchema::canonical() {
            warn!(
                "model artifact declares a non-canonical feature order: {:?}",
                model.schema().fields()
            );
        }

        Ok(Predictor {
            model,
            drivers,
            nationalities,
            constructors,
        })
    }

    /// Load predictor from the configured reference dataset and artifact
    pub fn load(config: &Config) -> Result<Self> {
        let reference = ReferenceDataset::load(&config.data.reference_path)?;
        let model = ModelArtifact::load(&config.model.artifact_path)?;
        Self::new(model, &reference, config.encoding.policy())
    }

    /// Predict the finishing position for one set of race inputs.
    ///
    /// One encode → assemble → predict sequence, no retries, no caching.
    pub fn predict(&self, inputs: &RaceInputs) -> Result<Prediction> {
        let driver_code = self.drivers.encode(&inputs.driver)?;
        let nationality_code = self.nationalities.encode(&inputs.nationality)?;
        let constructor_code = self.constructors.encode(&inputs.constructor)?;

        // Canonical model order; the artifact's arity gates delegation
        let fields = vec![
            inputs.grid as f32,
            driver_code.0 as f32,
            nationality_code.0 as f32,
            constructor_code.0 as f32,
            inputs.points,
            inputs.fastest_lap_rank as f32,
            inputs.laps as f32,
        ];
        let vector = FeatureVector::assemble(fields, self.model.arity())?;

        let position = self.model.predict(&vector)?;
        debug!(
            "predicted position {:.2} for {} ({}) from grid {}",
            position, inputs.driver, inputs.constructor, inputs.grid
        );

        Ok(Prediction {
            position,
            grid: inputs.grid,
            laps: inputs.laps,
        })
    }

    /// Decode a constructor code back to its display label
    pub fn decode_constructor(&self, code: CategoryCode) -> Result<&str> {
        self.constructors.decode(code)
    }

    pub fn drivers(&self) -> &CategoryDictionary {
        &self.drivers
    }

    pub fn nationalities(&self) -> &CategoryDictionary {
        &self.nationalities
    }

    pub fn constructors(&self) -> &CategoryDictionary {
        &self.constructors
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }
}

/// Asset path for a constructor's logo: lowercased, spaces stripped
pub fn constructor_asset(constructor: &str) -> String {
    format!("assets/{}.png", constructor.to_lowercase().replace(' ', ""))
}

/// Format a prediction for display
pub fn format_prediction(pred: &Prediction, driver: &str, constructor: &str) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} ({})
├─────────────────────────────────────────────────┤
│  Predicted position:  {}
│  Starting grid:       {}
│  Laps completed:      {}
└─────────────────────────────────────────────────┘
"#,
        driver,
        constructor,
        pred.display_position(),
        pred.grid,
        pred.laps
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PodiumError;

    const REFERENCE: &str = "\
grid,driverRef,nationality,constructorRef,points,rank,laps
5,hamilton,British,Mercedes,40,1,58
1,leclerc,Monegasque,Ferrari,26,2,58
8,norris,British,McLaren,12,5,57
";

    /// Artifact whose prediction is exactly the constructor code
    const ECHO_CONSTRUCTOR: &str = r#"{
        "meta": {
            "feature_names": ["grid", "driver_code", "nationality_code",
                              "constructor_code", "points", "fastest_lap_rank", "laps"]
        },
        "scaler": {
            "means": [0, 0, 0, 0, 0, 0, 0],
            "stds": [1, 1, 1, 1, 1, 1, 1]
        },
        "learners": [
            {"kind": "linear",
             "coefficients": [0, 0, 0, 1, 0, 0, 0],
             "intercept": 0.0}
        ],
        "blend": {"weights": [1.0], "intercept": 0.0}
    }"#;

    fn predictor(policy: UnknownCategoryPolicy) -> Predictor {
        let reference = ReferenceDataset::from_reader(REFERENCE.as_bytes()).unwrap();
        let model = ModelArtifact::from_json(ECHO_CONSTRUCTOR).unwrap();
        Predictor::new(model, &reference, policy).unwrap()
    }

    fn inputs() -> RaceInputs {
        RaceInputs {
            grid: 5,
            driver: "hamilton".to_string(),
            nationality: "British".to_string(),
            constructor: "Mercedes".to_string(),
            points: 40.0,
            fastest_lap_rank: 1,
            laps: 58,
        }
    }

    #[test]
    fn test_end_to_end_prediction() {
        let predictor = predictor(UnknownCategoryPolicy::Strict);
        // Constructors sort Ferrari/McLaren/Mercedes, so Mercedes encodes to 2
        // and the echo model reports it back unchanged
        let pred = predictor.predict(&inputs()).unwrap();
        assert_eq!(pred.position, 2.0);
        assert_eq!(pred.display_position(), 2);
        assert_eq!(pred.grid, 5);
        assert_eq!(pred.laps, 58);
    }

    #[test]
    fn test_unknown_driver_is_strict_error() {
        let predictor = predictor(UnknownCategoryPolicy::Strict);
        let mut unknown = inputs();
        unknown.driver = "verstappen".to_string();

        match predictor.predict(&unknown) {
            Err(PodiumError::UnknownCategory { column, value }) => {
                assert_eq!(column, "driverRef");
                assert_eq!(value, "verstappen");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_policy_predicts_for_unknowns() {
        let predictor = predictor(UnknownCategoryPolicy::Sentinel(CategoryCode(-1)));
        let mut unknown = inputs();
        unknown.constructor = "Red Bull".to_string();

        // Sentinel flows through the vector like any other code
        let pred = predictor.predict(&unknown).unwrap();
        assert_eq!(pred.position, -1.0);
    }

    #[test]
    fn test_decode_constructor() {
        let predictor = predictor(UnknownCategoryPolicy::Strict);
        assert_eq!(
            predictor.decode_constructor(CategoryCode(2)).unwrap(),
            "Mercedes"
        );
        assert!(predictor.decode_constructor(CategoryCode(9)).is_err());
    }

    #[test]
    fn test_constructor_asset_naming() {
        assert_eq!(constructor_asset("Red Bull"), "assets/redbull.png");
        assert_eq!(constructor_asset("Ferrari"), "assets/ferrari.png");
    }

    #[test]
    fn test_format_prediction_shows_inputs() {
        let pred = Prediction {
            position: 2.4,
            grid: 5,
            laps: 58,
        };
        let formatted = format_prediction(&pred, "hamilton", "Mercedes");
        assert!(formatted.contains("hamilton"));
        assert!(formatted.contains("Predicted position:  2"));
        assert!(formatted.contains("Starting grid:       5"));
        assert!(formatted.contains("Laps completed:      58"));
    }
}
