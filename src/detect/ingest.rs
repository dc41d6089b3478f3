use super::Detection;

/// Detections at or below this confidence are discarded before tracking.
pub const CONFIDENCE_FLOOR: f32 = 0.2;

/// Drop low-confidence detections from a raw detector result.
///
/// Pure filter: no state, input order preserved.
pub fn filter_confident(raw: Vec<Detection>) -> Vec<Detection> {
    raw.into_iter()
        .filter(|det| det.confidence > CONFIDENCE_FLOOR)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, confidence: f32) -> Detection {
        Detection {
            x: 0.1,
            y: 0.1,
            w: 0.2,
            h: 0.2,
            confidence,
            label: label.to_string(),
            mask: None,
        }
    }

    #[test]
    fn drops_detections_at_or_below_floor() {
        let raw = vec![det("person", 0.9), det("chair", 0.1), det("dog", 0.25)];
        let kept = filter_confident(raw);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].label, "person");
        assert_eq!(kept[1].label, "dog");
    }

    #[test]
    fn floor_itself_is_dropped() {
        let kept = filter_confident(vec![det("person", CONFIDENCE_FLOOR)]);
        assert!(kept.is_empty());
    }

    #[test]
    fn preserves_input_order() {
        let raw = vec![det("a", 0.5), det("b", 0.6), det("c", 0.7)];
        let kept = filter_confident(raw);
        let labels: Vec<_> = kept.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }
}
