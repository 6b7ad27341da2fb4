pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, summed in iteration order; `None` for an empty input.
    pub fn mean<I>(values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
        if value < lo {
            lo
        } else if value > hi {
            hi
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(StatsHelper::mean(Vec::new()), None);
    }

    #[test]
    fn mean_divides_by_count() {
        assert_eq!(StatsHelper::mean(vec![1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn clamp_bounds_both_sides() {
        assert_eq!(StatsHelper::clamp(3.0, -1.0, 1.0), 1.0);
        assert_eq!(StatsHelper::clamp(-3.0, -1.0, 1.0), -1.0);
        assert_eq!(StatsHelper::clamp(0.25, -1.0, 1.0), 0.25);
    }
}
