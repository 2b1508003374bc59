//! Proximity analysis — which neighbouring segments each respondent is close
//! to crossing into, and how likely that move is.

use std::collections::BTreeMap;
use std::fmt;

use matrix_core::config::{NeutralProximityMode, ProximityConfig};
use matrix_core::numeric::round2;
use matrix_core::types::{DataPoint, Segment};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::classifier::{Classify, QuadrantClassifier};
use crate::distance::DistanceCalculator;

// ─── Relationship Types ─────────────────────────────────────────────────────

/// Structural `{from, to}` pair; rendered as `"<from>_close_to_<to>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipKey {
    pub from: Segment,
    pub to: Segment,
}

impl RelationshipKey {
    pub fn new(from: Segment, to: Segment) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for RelationshipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_close_to_{}", self.from, self.to)
    }
}

impl Serialize for RelationshipKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Quadrants differing on one axis, e.g. loyalists ↔ mercenaries.
    Lateral,
    /// Quadrants differing on both axes, e.g. loyalists ↔ defectors.
    Diagonal,
    /// Target is a special zone, or a zone member leaving for its parent.
    SpecialZone,
    /// Source sits exactly on the midpoint.
    Crossroads,
}

impl RelationshipKind {
    pub fn between(from: Segment, to: Segment) -> Self {
        if from == Segment::Neutral {
            return RelationshipKind::Crossroads;
        }
        if to.is_special_zone() || from.parent_quadrant() == to.parent_quadrant() {
            return RelationshipKind::SpecialZone;
        }
        match (from.axis_sides(), to.axis_sides()) {
            (Some((fs, fl)), Some((ts, tl))) if fs != ts && fl != tl => RelationshipKind::Diagonal,
            _ => RelationshipKind::Lateral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75..=u8::MAX => RiskLevel::High,
            50..=74 => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }
}

/// Likelihood score in `[0, 100]`: 100 on the boundary, falling linearly to 0
/// at the threshold.
pub fn risk_score(distance: f64, threshold: f64) -> u8 {
    if distance <= 0.0 {
        return 100;
    }
    if threshold <= 0.0 || distance >= threshold {
        return 0;
    }
    (100.0 * (1.0 - distance / threshold)).round().clamp(0.0, 100.0) as u8
}

/// One scored "close to" relationship for one data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityRelationship {
    pub source_id: String,
    pub from: Segment,
    pub to: Segment,
    pub kind: RelationshipKind,
    pub distance: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

impl ProximityRelationship {
    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(self.from, self.to)
    }
}

// ─── Result Types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityCustomer {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub satisfaction: f64,
    pub loyalty: f64,
    pub distance: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityGroup {
    pub kind: RelationshipKind,
    pub customers: Vec<ProximityCustomer>,
    pub customer_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProximitySummary {
    pub points_analyzed: usize,
    pub points_with_relationships: usize,
    pub total_relationships: usize,
    pub lateral: usize,
    pub diagonal: usize,
    pub special_zone: usize,
    pub crossroads: usize,
    pub high_risk: usize,
    pub moderate_risk: usize,
    pub low_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbySegment {
    pub segment: Segment,
    pub distance: f64,
}

/// A point sitting exactly on the midpoint, with every segment it touches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossroadsPoint {
    pub id: String,
    pub name: String,
    pub satisfaction: f64,
    pub loyalty: f64,
    pub nearby: Vec<NearbySegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    pub analysis: BTreeMap<RelationshipKey, ProximityGroup>,
    pub summary: ProximitySummary,
    pub crossroads: Vec<CrossroadsPoint>,
}

// ─── Analyzer ───────────────────────────────────────────────────────────────

/// Scores every respondent against every other segment. Classification goes
/// through the shared classifier; only distances are computed here.
pub struct ProximityAnalyzer<'a> {
    classifier: &'a dyn Classify,
    distances: DistanceCalculator<'a>,
    config: ProximityConfig,
    targets: Vec<Segment>,
}

impl<'a> ProximityAnalyzer<'a> {
    pub fn new(classifier: &'a QuadrantClassifier, config: ProximityConfig) -> Self {
        Self::with_classifier(classifier, DistanceCalculator::new(classifier), config)
    }

    /// Pair an arbitrary classifier with a distance calculator, e.g. a
    /// classifier that wraps a [`QuadrantClassifier`].
    pub fn with_classifier(
        classifier: &'a dyn Classify,
        distances: DistanceCalculator<'a>,
        config: ProximityConfig,
    ) -> Self {
        let targets = Segment::MAIN_QUADRANTS
            .iter()
            .chain(Segment::SPECIAL_ZONES.iter())
            .copied()
            .filter(|segment| distances.supports(*segment))
            .collect();
        Self {
            classifier,
            distances,
            config,
            targets,
        }
    }

    fn threshold_for(&self, target: Segment) -> f64 {
        if target.is_special_zone() {
            self.config.special_zone_threshold
        } else {
            self.config.main_threshold
        }
    }

    /// Every segment other than the point's own within its threshold, in
    /// segment order.
    pub fn relationships_for(&self, point: &DataPoint) -> Vec<ProximityRelationship> {
        let own = self.classifier.classify(point);
        self.relationships_from(point, own)
    }

    fn relationships_from(&self, point: &DataPoint, own: Segment) -> Vec<ProximityRelationship> {
        let mut relationships = Vec::new();
        for &target in &self.targets {
            if target == own {
                continue;
            }
            let Some(distance) =
                self.distances
                    .distance_to_segment(point.satisfaction, point.loyalty, target)
            else {
                continue;
            };
            let threshold = self.threshold_for(target);
            if distance > threshold {
                continue;
            }
            let score = risk_score(distance, threshold);
            relationships.push(ProximityRelationship {
                source_id: point.id.clone(),
                from: own,
                to: target,
                kind: RelationshipKind::between(own, target),
                distance: round2(distance),
                risk_score: score,
                risk_level: RiskLevel::from_score(score),
            });
        }
        relationships
    }

    pub fn analyze(&self, points: &[DataPoint]) -> ProximityResult {
        let mut analysis: BTreeMap<RelationshipKey, ProximityGroup> = BTreeMap::new();
        let mut summary = ProximitySummary::default();
        let mut crossroads = Vec::new();

        for point in points.iter().filter(|p| !p.excluded) {
            summary.points_analyzed += 1;
            let own = self.classifier.classify(point);
            let relationships = self.relationships_from(point, own);

            if own == Segment::Neutral {
                crossroads.push(CrossroadsPoint {
                    id: point.id.clone(),
                    name: point.name.clone(),
                    satisfaction: point.satisfaction,
                    loyalty: point.loyalty,
                    nearby: relationships
                        .iter()
                        .map(|r| NearbySegment {
                            segment: r.to,
                            distance: r.distance,
                        })
                        .collect(),
                });
                if self.config.neutral_mode == NeutralProximityMode::CrossroadsOnly {
                    continue;
                }
            }

            if !relationships.is_empty() {
                summary.points_with_relationships += 1;
            }

            for relationship in relationships {
                summary.total_relationships += 1;
                match relationship.kind {
                    RelationshipKind::Lateral => summary.lateral += 1,
                    RelationshipKind::Diagonal => summary.diagonal += 1,
                    RelationshipKind::SpecialZone => summary.special_zone += 1,
                    RelationshipKind::Crossroads => summary.crossroads += 1,
                }
                match relationship.risk_level {
                    RiskLevel::High => summary.high_risk += 1,
                    RiskLevel::Moderate => summary.moderate_risk += 1,
                    RiskLevel::Low => summary.low_risk += 1,
                }

                let group = analysis
                    .entry(relationship.key())
                    .or_insert_with(|| ProximityGroup {
                        kind: relationship.kind,
                        customers: Vec::new(),
                        customer_count: 0,
                    });
                group.customers.push(ProximityCustomer {
                    id: point.id.clone(),
                    name: point.name.clone(),
                    email: point.email.clone(),
                    satisfaction: point.satisfaction,
                    loyalty: point.loyalty,
                    distance: relationship.distance,
                    risk_score: relationship.risk_score,
                    risk_level: relationship.risk_level,
                });
                group.customer_count += 1;
            }
        }

        for group in analysis.values_mut() {
            group.customers.sort_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        debug!(
            points = summary.points_analyzed,
            relationships = summary.total_relationships,
            groups = analysis.len(),
            crossroads = crossroads.len(),
            "Proximity analysis complete"
        );

        ProximityResult {
            analysis,
            summary,
            crossroads,
        }
    }
}

/// Run proximity analysis with the shared classifier.
pub fn analyze_proximity(
    points: &[DataPoint],
    classifier: &QuadrantClassifier,
    config: ProximityConfig,
) -> ProximityResult {
    ProximityAnalyzer::new(classifier, config).analyze(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_core::config::MatrixConfig;

    fn zoned_config() -> MatrixConfig {
        let mut config = MatrixConfig::default();
        config.zones.enabled = true;
        config
    }

    #[test]
    fn test_risk_score_bands() {
        assert_eq!(risk_score(0.0, 2.0), 100);
        assert_eq!(risk_score(0.5, 2.0), 75);
        assert_eq!(risk_score(1.0, 2.0), 50);
        assert_eq!(risk_score(1.5, 2.0), 25);
        assert_eq!(risk_score(2.0, 2.0), 0);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(74), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Low);
    }

    #[test]
    fn test_risk_score_never_increases_with_distance() {
        let mut previous = u8::MAX;
        for step in 0..=40 {
            let score = risk_score(step as f64 * 0.05, 2.0);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_relationship_kinds() {
        use Segment::*;
        assert_eq!(RelationshipKind::between(Loyalists, Mercenaries), RelationshipKind::Lateral);
        assert_eq!(RelationshipKind::between(Hostages, Loyalists), RelationshipKind::Lateral);
        assert_eq!(RelationshipKind::between(Loyalists, Defectors), RelationshipKind::Diagonal);
        assert_eq!(RelationshipKind::between(Mercenaries, Hostages), RelationshipKind::Diagonal);
        assert_eq!(RelationshipKind::between(Apostles, Hostages), RelationshipKind::Lateral);
        assert_eq!(RelationshipKind::between(Terrorists, Loyalists), RelationshipKind::Diagonal);
        assert_eq!(RelationshipKind::between(Loyalists, Apostles), RelationshipKind::SpecialZone);
        assert_eq!(RelationshipKind::between(Apostles, Loyalists), RelationshipKind::SpecialZone);
        assert_eq!(RelationshipKind::between(Neutral, Defectors), RelationshipKind::Crossroads);
    }

    #[test]
    fn test_key_renders_as_string() {
        let key = RelationshipKey::new(Segment::Loyalists, Segment::NearApostles);
        assert_eq!(key.to_string(), "loyalists_close_to_near_apostles");
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"loyalists_close_to_near_apostles\""
        );
    }

    #[test]
    fn test_point_near_both_axes() {
        let config = MatrixConfig::default();
        let classifier = QuadrantClassifier::new(&config);
        let analyzer = ProximityAnalyzer::new(&classifier, config.proximity);

        // Loyalist half a unit from mercenaries, one unit from hostages.
        let point = DataPoint::new("p1", 4.0, 3.5);
        let relationships = analyzer.relationships_for(&point);
        let by_target: BTreeMap<Segment, &ProximityRelationship> =
            relationships.iter().map(|r| (r.to, r)).collect();

        let merc = by_target[&Segment::Mercenaries];
        assert_eq!(merc.distance, 0.5);
        assert_eq!(merc.kind, RelationshipKind::Lateral);
        assert_eq!(merc.risk_level, RiskLevel::High);

        let hostages = by_target[&Segment::Hostages];
        assert_eq!(hostages.distance, 1.0);
        assert_eq!(hostages.risk_level, RiskLevel::Moderate);

        let defectors = by_target[&Segment::Defectors];
        assert_eq!(defectors.kind, RelationshipKind::Diagonal);
        assert_eq!(defectors.distance, 1.0);
        assert!(!by_target.contains_key(&Segment::Loyalists));
    }

    #[test]
    fn test_far_points_have_no_relationships() {
        let mut config = MatrixConfig::default();
        config.scale.satisfaction = matrix_core::ScaleFormat::OneToTen;
        config.scale.loyalty = matrix_core::ScaleFormat::OneToTen;
        let classifier = QuadrantClassifier::new(&config);
        let analyzer = ProximityAnalyzer::new(&classifier, config.proximity);
        assert!(analyzer
            .relationships_for(&DataPoint::new("far", 10.0, 10.0))
            .is_empty());
    }

    #[test]
    fn test_special_zone_uses_tighter_threshold() {
        let config = zoned_config();
        let classifier = QuadrantClassifier::new(&config);
        let analyzer = ProximityAnalyzer::new(&classifier, config.proximity);

        let near = analyzer.relationships_for(&DataPoint::new("near", 3.5, 3.5));
        let to_apostles = near.iter().find(|r| r.to == Segment::Apostles).unwrap();
        assert_eq!(to_apostles.distance, 0.5);
        assert_eq!(to_apostles.risk_score, 50);
        assert_eq!(to_apostles.kind, RelationshipKind::SpecialZone);

        // A hostage 1.5 units left of the apostles corner: inside the main
        // threshold for loyalists, outside the special-zone threshold.
        let far = analyzer.relationships_for(&DataPoint::new("far", 2.5, 4.5));
        assert!(far.iter().all(|r| r.to != Segment::Apostles));
        assert!(far.iter().any(|r| r.to == Segment::Loyalists));
    }

    #[test]
    fn test_apostle_close_to_leaving_zone() {
        let config = zoned_config();
        let classifier = QuadrantClassifier::new(&config);
        let analyzer = ProximityAnalyzer::new(&classifier, config.proximity);
        let relationships = analyzer.relationships_for(&DataPoint::new("a", 4.25, 4.75));
        let to_loyalists = relationships
            .iter()
            .find(|r| r.to == Segment::Loyalists)
            .unwrap();
        assert_eq!(to_loyalists.from, Segment::Apostles);
        assert_eq!(to_loyalists.distance, 0.25);
        assert_eq!(to_loyalists.kind, RelationshipKind::SpecialZone);
    }

    #[test]
    fn test_analyze_groups_and_skips_excluded() {
        let config = MatrixConfig::default();
        let classifier = QuadrantClassifier::new(&config);
        let points = vec![
            DataPoint::new("a", 4.0, 3.5).with_name("Ana"),
            DataPoint::new("b", 3.5, 3.25).with_name("Ben"),
            DataPoint::new("c", 4.0, 3.5).excluded(),
        ];
        let result = analyze_proximity(&points, &classifier, config.proximity);
        assert_eq!(result.summary.points_analyzed, 2);
        assert_eq!(result.summary.points_with_relationships, 2);

        let key = RelationshipKey::new(Segment::Loyalists, Segment::Mercenaries);
        let group = &result.analysis[&key];
        assert_eq!(group.customer_count, 2);
        // Closest first.
        assert_eq!(group.customers[0].id, "b");
        assert_eq!(group.customers[1].id, "a");
        assert!(result.crossroads.is_empty());
    }

    #[test]
    fn test_neutral_point_is_crossroads() {
        let config = zoned_config();
        let classifier = QuadrantClassifier::new(&config);
        let points = vec![DataPoint::new("mid", 3.0, 3.0)];
        let result = analyze_proximity(&points, &classifier, config.proximity);

        assert_eq!(result.crossroads.len(), 1);
        let nearby: Vec<Segment> = result.crossroads[0].nearby.iter().map(|n| n.segment).collect();
        assert_eq!(
            nearby,
            vec![
                Segment::Loyalists,
                Segment::Mercenaries,
                Segment::Hostages,
                Segment::Defectors,
                Segment::Apostles,
                Segment::Terrorists,
            ]
        );
        assert!(result.crossroads[0].nearby[..4].iter().all(|n| n.distance == 0.0));
        assert_eq!(result.summary.crossroads, 6);
        let group = &result.analysis[&RelationshipKey::new(Segment::Neutral, Segment::Defectors)];
        assert_eq!(group.customers[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_crossroads_only_mode_keeps_neutral_out_of_analysis() {
        let mut config = MatrixConfig::default();
        config.proximity.neutral_mode = NeutralProximityMode::CrossroadsOnly;
        let classifier = QuadrantClassifier::new(&config);
        let points = vec![DataPoint::new("mid", 3.0, 3.0)];
        let result = analyze_proximity(&points, &classifier, config.proximity);
        assert_eq!(result.crossroads.len(), 1);
        assert_eq!(result.crossroads[0].nearby.len(), 4);
        assert!(result.analysis.is_empty());
        assert_eq!(result.summary.total_relationships, 0);
    }

    #[test]
    fn test_manual_assignment_drives_source_segment() {
        let config = MatrixConfig::default().with_assignment("m", Segment::Hostages);
        let classifier = QuadrantClassifier::new(&config);
        let analyzer = ProximityAnalyzer::new(&classifier, config.proximity);
        let relationships = analyzer.relationships_for(&DataPoint::new("m", 4.0, 4.0));
        assert!(relationships.iter().all(|r| r.from == Segment::Hostages));
        assert!(relationships.iter().all(|r| r.to != Segment::Hostages));
        let loyalists = relationships.iter().find(|r| r.to == Segment::Loyalists).unwrap();
        assert_eq!(loyalists.distance, 0.0);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let config = zoned_config();
        let classifier = QuadrantClassifier::new(&config);
        let points: Vec<DataPoint> = (0..20)
            .map(|i| DataPoint::new(format!("p{i}"), 1.0 + (i % 5) as f64, 1.0 + (i / 4) as f64))
            .collect();
        let first = analyze_proximity(&points, &classifier, config.proximity);
        let second = analyze_proximity(&points, &classifier, config.proximity);
        assert_eq!(first, second);
    }
}
