use std::collections::HashMap;

use super::model::Boat;

/// Scatter plots draw at most this many points.
pub const MAX_SCATTER_POINTS: usize = 500;

/// Years at or below this are treated as noise in the scatter plot.
const MIN_SCATTER_YEAR: i64 = 1900;

/// Upper bounds (exclusive) of the price histogram buckets. The last bucket
/// is open-ended.
const HISTOGRAM_BOUNDS: [f64; 4] = [100_000.0, 500_000.0, 1_000_000.0, 5_000_000.0];

pub const HISTOGRAM_LABELS: [&str; 5] = ["<100k", "100k-500k", "500k-1M", "1M-5M", ">5M"];

/// Placeholder shown for text KPIs of an empty subset.
pub const PLACEHOLDER: &str = "-";

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Summary metrics of a listing subset. All zero for an empty subset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kpis {
    pub total: usize,
    pub total_value: f64,
    pub avg_price: f64,
    pub avg_price_per_meter: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub sold_count: usize,
    /// Most frequent builder; `None` when the subset is empty.
    pub top_builder: Option<String>,
    pub avg_length: f64,
}

/// One labelled KPI display.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub subtext: &'static str,
    /// Long values render in a smaller font.
    pub small: bool,
}

pub fn compute_kpis(boats: &[&Boat]) -> Kpis {
    let total = boats.len();
    if total == 0 {
        return Kpis::default();
    }

    let total_value: f64 = boats.iter().map(|b| b.price_or_zero()).sum();

    let (ratio_sum, ratio_count) = boats
        .iter()
        .filter(|b| b.length_or_zero() > 0.0 && b.price_or_zero() > 0.0)
        .fold((0.0, 0usize), |(sum, n), b| {
            (sum + b.price_or_zero() / b.length_or_zero(), n + 1)
        });
    let avg_price_per_meter = if ratio_count > 0 {
        ratio_sum / ratio_count as f64
    } else {
        0.0
    };

    let positive_prices = boats.iter().map(|b| b.price_or_zero()).filter(|p| *p > 0.0);
    let (price_min, price_max) = positive_prices.fold(None, |acc: Option<(f64, f64)>, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
    .unwrap_or((0.0, 0.0));

    let avg_length = boats.iter().map(|b| b.length_or_zero()).sum::<f64>() / total as f64;

    Kpis {
        total,
        total_value,
        avg_price: total_value / total as f64,
        avg_price_per_meter,
        price_min,
        price_max,
        sold_count: boats.iter().filter(|b| b.is_sold).count(),
        top_builder: modal_builder(boats),
        avg_length,
    }
}

/// Builder with the highest count; ties go to the one tallied first.
fn modal_builder(boats: &[&Boat]) -> Option<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for b in boats {
        let count = counts.entry(b.builder.as_str()).or_insert_with(|| {
            order.push(b.builder.as_str());
            0
        });
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for name in order {
        let n = counts[name];
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((name, n));
        }
    }
    best.map(|(name, _)| name.to_string())
}

impl Kpis {
    /// The eight KPI cards in display order.
    pub fn cards(&self) -> [KpiCard; 8] {
        let top_builder = match self.top_builder.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => PLACEHOLDER.to_string(),
        };
        [
            KpiCard {
                title: "Total Boats",
                value: self.total.to_string(),
                subtext: "In inventory",
                small: false,
            },
            KpiCard {
                title: "Total Value",
                value: format_currency(self.total_value),
                subtext: "Market cap",
                small: false,
            },
            KpiCard {
                title: "Avg. Price",
                value: format_currency(self.avg_price),
                subtext: "Per boat",
                small: false,
            },
            KpiCard {
                title: "Avg. €/Meter",
                value: format_currency(self.avg_price_per_meter),
                subtext: "Per linear m",
                small: false,
            },
            KpiCard {
                title: "Price Range",
                value: format!(
                    "{} - {}",
                    format_currency(self.price_min),
                    format_currency(self.price_max)
                ),
                subtext: "Min to Max",
                small: true,
            },
            KpiCard {
                title: "Sold",
                value: self.sold_count.to_string(),
                subtext: "Boats sold",
                small: false,
            },
            KpiCard {
                title: "Top Builder",
                value: top_builder,
                subtext: "Most listings",
                small: true,
            },
            KpiCard {
                title: "Avg. Length",
                value: format!("{:.1}m", self.avg_length),
                subtext: "LOA average",
                small: false,
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Chart projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub year: f64,
    pub price: f64,
    pub length: f64,
    pub builder: String,
    pub model: String,
}

/// Project listings onto (year, price, length), keeping the first
/// [`MAX_SCATTER_POINTS`] with a year after 1900 and a positive price.
pub fn scatter_points(boats: &[&Boat]) -> Vec<ScatterPoint> {
    boats
        .iter()
        .filter_map(|b| {
            let year = b.year_built.filter(|y| *y > MIN_SCATTER_YEAR)?;
            let price = b.price_eur.filter(|p| p.is_finite() && *p > 0.0)?;
            Some(ScatterPoint {
                year: year as f64,
                price,
                length: b.length_or_zero(),
                builder: b.builder.clone(),
                model: b.model.clone(),
            })
        })
        .take(MAX_SCATTER_POINTS)
        .collect()
}

/// Index of the histogram bucket for a price. Unknown and non-positive
/// prices land in the first bucket.
pub fn price_bucket(price: f64) -> usize {
    HISTOGRAM_BOUNDS
        .iter()
        .position(|upper| price < *upper)
        .unwrap_or(HISTOGRAM_BOUNDS.len())
}

/// Count listings per price bucket; see [`HISTOGRAM_LABELS`].
pub fn price_histogram(boats: &[&Boat]) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for b in boats {
        counts[price_bucket(b.price_or_zero())] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Compact euro amount: `€1.2M`, `€350k`, `€900`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("€{:.1}M", (value / 100_000.0).round() / 10.0)
    } else if value >= 1_000.0 {
        format!("€{}k", (value / 1_000.0).round())
    } else {
        format!("€{}", value.round())
    }
}

/// Full euro amount with thousands separators: `€1,234,567`.
pub fn format_price_full(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat(builder: &str, year: Option<i64>, length: Option<f64>, price: Option<f64>, sold: bool) -> Boat {
        Boat {
            builder: builder.to_string(),
            year_built: year,
            length,
            price_eur: price,
            is_sold: sold,
            ..Default::default()
        }
    }

    fn refs(boats: &[Boat]) -> Vec<&Boat> {
        boats.iter().collect()
    }

    #[test]
    fn scenario_single_record_kpis() {
        let boats = vec![boat("A", Some(2000), Some(10.0), Some(50_000.0), false)];
        let kpis = compute_kpis(&refs(&boats));
        assert_eq!(kpis.total, 1);
        assert_eq!(kpis.total_value, 50_000.0);
        assert_eq!(kpis.avg_price, 50_000.0);
        assert_eq!(kpis.avg_price_per_meter, 5_000.0);
        assert_eq!(kpis.top_builder.as_deref(), Some("A"));
        assert_eq!(kpis.avg_length, 10.0);
    }

    #[test]
    fn empty_subset_degrades_to_zero_and_placeholder() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis, Kpis::default());
        let cards = kpis.cards();
        assert_eq!(cards[0].value, "0");
        assert_eq!(cards[1].value, "€0");
        assert_eq!(cards[4].value, "€0 - €0");
        assert_eq!(cards[6].value, "-");
        assert_eq!(cards[7].value, "0.0m");
        assert!(scatter_points(&[]).is_empty());
        assert_eq!(price_histogram(&[]), [0; 5]);
    }

    #[test]
    fn totals_and_ratios_skip_unknown_values() {
        let boats = vec![
            boat("A", Some(2000), Some(10.0), Some(100_000.0), false),
            boat("B", Some(2001), None, Some(300_000.0), true),
            boat("B", Some(2002), Some(20.0), None, false),
            boat("C", Some(2003), Some(30.0), Some(600_000.0), true),
        ];
        let kpis = compute_kpis(&refs(&boats));
        assert_eq!(kpis.total, 4);
        assert_eq!(kpis.total_value, 1_000_000.0);
        assert_eq!(kpis.avg_price, 250_000.0);
        // (100k/10 + 600k/30) / 2 qualifying records
        assert_eq!(kpis.avg_price_per_meter, 15_000.0);
        assert_eq!(kpis.price_min, 100_000.0);
        assert_eq!(kpis.price_max, 600_000.0);
        assert_eq!(kpis.sold_count, 2);
        assert_eq!(kpis.top_builder.as_deref(), Some("B"));
        assert_eq!(kpis.avg_length, 15.0);
    }

    #[test]
    fn no_qualifying_ratio_records_gives_zero() {
        let boats = vec![boat("A", Some(2000), None, Some(10.0), false), boat("A", Some(2000), Some(5.0), Some(0.0), false)];
        let kpis = compute_kpis(&refs(&boats));
        assert_eq!(kpis.avg_price_per_meter, 0.0);
        assert_eq!(kpis.price_min, 10.0);
        assert_eq!(kpis.price_max, 10.0);
    }

    #[test]
    fn modal_builder_ties_go_to_first_seen() {
        let boats = vec![
            boat("Riva", None, None, None, false),
            boat("Azimut", None, None, None, false),
            boat("Azimut", None, None, None, false),
            boat("Riva", None, None, None, false),
        ];
        assert_eq!(compute_kpis(&refs(&boats)).top_builder.as_deref(), Some("Riva"));
    }

    #[test]
    fn scatter_filters_noise_and_caps_points() {
        let mut boats = vec![
            boat("A", Some(1900), Some(10.0), Some(1.0), false),
            boat("A", None, Some(10.0), Some(1.0), false),
            boat("A", Some(2000), Some(10.0), Some(0.0), false),
            boat("A", Some(2000), Some(10.0), None, false),
            boat("A", Some(2000), Some(10.0), Some(f64::NAN), false),
        ];
        for i in 0..600 {
            boats.push(boat("B", Some(1901 + i), None, Some(1_000.0 + i as f64), false));
        }
        let points = scatter_points(&refs(&boats));
        assert_eq!(points.len(), MAX_SCATTER_POINTS);
        assert_eq!(points[0].year, 1901.0);
        assert_eq!(points[0].length, 0.0);
        assert_eq!(points[499].price, 1_499.0);
        assert!(points.iter().all(|p| p.year > 1900.0 && p.price > 0.0));
    }

    #[test]
    fn histogram_boundaries_are_lower_inclusive() {
        assert_eq!(price_bucket(-5.0), 0);
        assert_eq!(price_bucket(0.0), 0);
        assert_eq!(price_bucket(99_999.99), 0);
        assert_eq!(price_bucket(100_000.0), 1);
        assert_eq!(price_bucket(499_999.0), 1);
        assert_eq!(price_bucket(500_000.0), 2);
        assert_eq!(price_bucket(1_000_000.0), 3);
        assert_eq!(price_bucket(4_999_999.0), 3);
        assert_eq!(price_bucket(5_000_000.0), 4);
        assert_eq!(price_bucket(50_000_000.0), 4);
    }

    #[test]
    fn histogram_counts_every_record_once() {
        let boats = vec![
            boat("A", None, None, None, false),
            boat("A", None, None, Some(0.0), false),
            boat("A", None, None, Some(100_000.0), false),
            boat("A", None, None, Some(500_000.0), false),
            boat("A", None, None, Some(1_000_000.0), false),
            boat("A", None, None, Some(5_000_000.0), false),
            boat("A", None, None, Some(2_000_000.0), false),
        ];
        let hist = price_histogram(&refs(&boats));
        assert_eq!(hist, [2, 1, 1, 2, 1]);
        assert_eq!(hist.iter().sum::<usize>(), boats.len());
    }

    #[test]
    fn currency_formatting_thresholds() {
        assert_eq!(format_currency(0.0), "€0");
        assert_eq!(format_currency(999.4), "€999");
        assert_eq!(format_currency(1_000.0), "€1k");
        assert_eq!(format_currency(2_500.0), "€3k");
        assert_eq!(format_currency(999_499.0), "€999k");
        assert_eq!(format_currency(1_000_000.0), "€1.0M");
        assert_eq!(format_currency(2_350_000.0), "€2.4M");
    }

    #[test]
    fn full_price_has_thousands_separators() {
        assert_eq!(format_price_full(0.0), "€0");
        assert_eq!(format_price_full(950.0), "€950");
        assert_eq!(format_price_full(1_234_567.0), "€1,234,567");
        assert_eq!(format_price_full(100_000.0), "€100,000");
    }
}
