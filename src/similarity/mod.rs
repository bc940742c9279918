use crate::{
    error::Error,
    joints::JointAngle,
    normalize::{CentroidScale, Normalize},
    pose::{Pose, DEFAULT_CONFIDENCE},
};
use std::borrow::Cow;
use tracing::trace;

mod invariant_features;
mod key_angles;
mod relative_angles;

/// Per-feature score for two angles in degrees: 1 when equal, 0 when opposite.
#[inline]
pub(crate) fn angle_agreement(a: f32, b: f32) -> f32 {
    (1.0 - (a - b).abs() / 180.0).clamp(0.0, 1.0)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SimilarityStrategy {
    /// Compare a caller-selected subset of named joint angles.
    KeyAngles,
    /// Compare the angles between every pair of body segments.
    RelativeAngles,
    /// Compare segment-length ratios and joint angles.
    InvariantFeatures,
}

impl SimilarityStrategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::KeyAngles => "key_angles",
            Self::RelativeAngles => "relative_angles",
            Self::InvariantFeatures => "invariant_features",
        }
    }

    /// Score how alike `a` and `b` are, in `[0, 1]`.
    ///
    /// `selected` only affects `KeyAngles`. Keypoints below `confidence` fail the call
    /// rather than contributing to the score.
    pub fn similarity(
        self,
        a: &Pose,
        b: &Pose,
        selected: &[JointAngle],
        confidence: f32,
    ) -> Result<f32, Error> {
        match self {
            Self::KeyAngles => key_angles::similarity(a, b, selected, confidence),
            Self::RelativeAngles => relative_angles::similarity(a, b, confidence),
            Self::InvariantFeatures => invariant_features::similarity(a, b, confidence),
        }
    }
}

impl std::str::FromStr for SimilarityStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key_angles" | "keyAngles" => Ok(Self::KeyAngles),
            "relative_angles" | "relativeAngles" => Ok(Self::RelativeAngles),
            "invariant_features" | "invariantFeatures" => Ok(Self::InvariantFeatures),
            _ => Err(Error::UnknownStrategy(s.to_owned())),
        }
    }
}

impl std::fmt::Display for SimilarityStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedStrategy {
    pub strategy: SimilarityStrategy,
    weight: f32,
    pub selected_angles: Vec<JointAngle>,
}

impl WeightedStrategy {
    /// A weight of zero keeps the strategy evaluated but out of the blend.
    pub fn new(strategy: SimilarityStrategy, weight: f32) -> Result<Self, Error> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight(weight));
        }
        Ok(Self {
            strategy,
            weight,
            selected_angles: Vec::new(),
        })
    }

    pub fn with_angles(mut self, angles: &[JointAngle]) -> Self {
        self.selected_angles = angles.to_vec();
        self
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }
}

/// Parses `name` or `name=weight`; the weight defaults to 1.
impl std::str::FromStr for WeightedStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '=');
        let strategy = parts.next().unwrap_or_default().trim().parse()?;
        let weight = match parts.next() {
            Some(weight) => {
                let weight = weight.trim();
                weight
                    .parse::<f32>()
                    .map_err(|e| Error::ParseWeight(e, weight.to_owned()))?
            }
            None => 1.0,
        };
        Self::new(strategy, weight)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombineOptions {
    pub strategies: Vec<WeightedStrategy>,
    pub normalize: bool,
    pub confidence: f32,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
            normalize: false,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl CombineOptions {
    /// The blend used to recognise a squat against a reference pose: relative angles only,
    /// with key angles (all eight selected) and invariant features evaluated at weight zero.
    pub fn reference_squat() -> Self {
        Self {
            strategies: vec![
                WeightedStrategy {
                    strategy: SimilarityStrategy::KeyAngles,
                    weight: 0.0,
                    selected_angles: JointAngle::ALL.to_vec(),
                },
                WeightedStrategy {
                    strategy: SimilarityStrategy::RelativeAngles,
                    weight: 1.0,
                    selected_angles: Vec::new(),
                },
                WeightedStrategy {
                    strategy: SimilarityStrategy::InvariantFeatures,
                    weight: 0.0,
                    selected_angles: Vec::new(),
                },
            ],
            normalize: true,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Weighted blend of strategy scores, normalizing both poses first with [`CentroidScale`]
/// when `options.normalize` is set. The normalizer anchors on the keypoints that pass
/// `options.confidence`.
pub fn combine(a: &Pose, b: &Pose, options: &CombineOptions) -> Result<f32, Error> {
    let normalizer = CentroidScale {
        min_score: options.confidence,
    };
    combine_with(&normalizer, a, b, options)
}

/// Like [`combine`], with a caller-supplied normalizer.
///
/// Every listed strategy is evaluated, including zero-weight ones. A total weight of
/// zero yields exactly 0.
pub fn combine_with<N>(
    normalizer: &N,
    a: &Pose,
    b: &Pose,
    options: &CombineOptions,
) -> Result<f32, Error>
where
    N: Normalize + ?Sized,
{
    let (a, b) = if options.normalize {
        (
            Cow::Owned(normalizer.normalize(a)?),
            Cow::Owned(normalizer.normalize(b)?),
        )
    } else {
        (Cow::Borrowed(a), Cow::Borrowed(b))
    };

    let (weighted, total_weight) = options.strategies.iter().try_fold(
        (0.0, 0.0),
        |(weighted, total_weight), entry| -> Result<(f32, f32), Error> {
            let score =
                entry
                    .strategy
                    .similarity(&a, &b, &entry.selected_angles, options.confidence)?;
            trace!(
                message = "strategy score",
                strategy = entry.strategy.name(),
                weight = entry.weight,
                score
            );
            Ok((weighted + score * entry.weight, total_weight + entry.weight))
        },
    )?;

    Ok(if total_weight > 0.0 {
        (weighted / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::{combine, combine_with, CombineOptions, SimilarityStrategy, WeightedStrategy};
    use crate::{
        error::Error,
        fixtures,
        joints::JointAngle,
        normalize::{CentroidScale, Identity},
    };
    use assert_approx_eq::assert_approx_eq;

    const ALL: [SimilarityStrategy; 3] = [
        SimilarityStrategy::KeyAngles,
        SimilarityStrategy::RelativeAngles,
        SimilarityStrategy::InvariantFeatures,
    ];

    fn options(weights: &[(SimilarityStrategy, f32)], normalize: bool) -> CombineOptions {
        CombineOptions {
            strategies: weights
                .iter()
                .map(|&(strategy, weight)| {
                    WeightedStrategy::new(strategy, weight)
                        .unwrap()
                        .with_angles(&JointAngle::ALL)
                })
                .collect(),
            normalize,
            ..Default::default()
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn strategy_names() {
            assert_eq!(
                "relativeAngles".parse::<SimilarityStrategy>().unwrap(),
                SimilarityStrategy::RelativeAngles
            );
            assert_eq!(
                "invariant_features".parse::<SimilarityStrategy>().unwrap(),
                SimilarityStrategy::InvariantFeatures
            );
        }

        #[test]
        fn unknown_strategy() {
            assert!(matches!(
                "procrustes=1".parse::<WeightedStrategy>(),
                Err(Error::UnknownStrategy(name)) if name == "procrustes"
            ));
        }

        #[test]
        fn weighted() {
            let entry = "key_angles=0.25".parse::<WeightedStrategy>().unwrap();
            assert_eq!(entry.strategy, SimilarityStrategy::KeyAngles);
            assert_approx_eq!(entry.weight(), 0.25);
            assert_approx_eq!(
                "relative_angles".parse::<WeightedStrategy>().unwrap().weight(),
                1.0
            );
        }

        #[test]
        fn bad_weights() {
            assert!(matches!(
                "key_angles=-1".parse::<WeightedStrategy>(),
                Err(Error::InvalidWeight(w)) if w == -1.0
            ));
            let err = "key_angles= heavy".parse::<WeightedStrategy>().unwrap_err();
            assert!(matches!(&err, Error::ParseWeight(_, text) if text == "heavy"));
            assert!(err.to_string().contains("heavy"));
            assert!(WeightedStrategy::new(SimilarityStrategy::KeyAngles, f32::NAN).is_err());
        }
    }

    mod combine_tests {
        use super::*;

        #[test]
        fn identical_poses_score_one_for_every_strategy() {
            let pose = fixtures::squat_pose();
            for &strategy in ALL.iter() {
                let score = combine(&pose, &pose, &options(&[(strategy, 1.0)], true)).unwrap();
                assert_approx_eq!(score, 1.0, 1e-5);
            }
        }

        #[test]
        fn equal_weights_over_equal_scores() {
            let a = fixtures::squat_pose();
            let b = fixtures::standing_pose();
            let single = combine(
                &a,
                &b,
                &options(&[(SimilarityStrategy::RelativeAngles, 1.0)], true),
            )
            .unwrap();
            let tripled = combine(
                &a,
                &b,
                &options(
                    &[
                        (SimilarityStrategy::RelativeAngles, 1.0),
                        (SimilarityStrategy::RelativeAngles, 1.0),
                        (SimilarityStrategy::RelativeAngles, 1.0),
                    ],
                    true,
                ),
            )
            .unwrap();
            assert_approx_eq!(single, tripled, 1e-6);
        }

        #[test]
        fn all_zero_weights_is_exactly_zero() {
            let pose = fixtures::squat_pose();
            let score = combine(
                &pose,
                &pose,
                &options(
                    &[
                        (SimilarityStrategy::KeyAngles, 0.0),
                        (SimilarityStrategy::RelativeAngles, 0.0),
                    ],
                    true,
                ),
            )
            .unwrap();
            assert_eq!(score, 0.0);
            assert_eq!(
                combine(&pose, &pose, &CombineOptions::default()).unwrap(),
                0.0
            );
        }

        #[test]
        fn order_does_not_matter() {
            let a = fixtures::squat_pose();
            let b = fixtures::bent_arm_pose();
            let forward = [
                (SimilarityStrategy::KeyAngles, 0.5),
                (SimilarityStrategy::RelativeAngles, 2.0),
                (SimilarityStrategy::InvariantFeatures, 1.0),
            ];
            let mut backward = forward;
            backward.reverse();
            assert_approx_eq!(
                combine(&a, &b, &options(&forward, true)).unwrap(),
                combine(&a, &b, &options(&backward, true)).unwrap(),
                1e-5
            );
        }

        #[test]
        fn zero_weight_strategy_is_still_evaluated() {
            let a = fixtures::squat_pose();
            let b = fixtures::with_score(&a, "left_ankle", 0.0);
            let result = combine(
                &a,
                &b,
                &options(
                    &[
                        (SimilarityStrategy::KeyAngles, 0.0),
                        (SimilarityStrategy::RelativeAngles, 1.0),
                    ],
                    false,
                ),
            );
            assert!(matches!(result, Err(Error::InsufficientVisibility { .. })));
        }

        #[test]
        fn caller_supplied_normalizer() {
            let a = fixtures::squat_pose();
            let b = fixtures::transformed(&fixtures::squat_pose(), 0.0, 3.0, 50.0, 20.0);
            let weights = [(SimilarityStrategy::KeyAngles, 1.0)];

            let raw = combine(&a, &b, &options(&weights, false)).unwrap();
            let identity = combine_with(&Identity, &a, &b, &options(&weights, true)).unwrap();
            assert_eq!(identity, raw);

            let centroid = combine_with(
                &CentroidScale { min_score: 0.5 },
                &a,
                &b,
                &options(&weights, true),
            )
            .unwrap();
            assert_approx_eq!(centroid, 1.0, 1e-5);
        }

        #[test]
        fn normalizer_anchors_follow_confidence() {
            // every keypoint scores below the default cutoff but above the caller's
            let a = fixtures::rescored(&fixtures::squat_pose(), 0.2);
            let b = fixtures::rescored(&fixtures::bent_arm_pose(), 0.2);
            let mut low = options(&[(SimilarityStrategy::RelativeAngles, 1.0)], true);
            low.confidence = 0.1;
            let score = combine(&a, &b, &low).unwrap();
            assert!(score > 0.0 && score < 1.0, "score was {}", score);
        }

        #[test]
        fn reference_blend_matches_relative_angles() {
            let a = fixtures::squat_pose();
            let b = fixtures::bent_arm_pose();
            let reference = combine(&a, &b, &CombineOptions::reference_squat()).unwrap();
            let relative = combine(
                &a,
                &b,
                &options(&[(SimilarityStrategy::RelativeAngles, 1.0)], true),
            )
            .unwrap();
            assert_approx_eq!(reference, relative, 1e-6);
            assert!(reference < 1.0);
        }
    }
}
