use std::cmp::Ordering;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crate::color::ColorMap;
use crate::config::DEFAULT_FILTER_DEBOUNCE;
use crate::data::aggregate::{self, Kpis, ScatterPoint};
use crate::data::facet;
use crate::data::filter::{
    DEFAULT_LENGTH_RANGE, DEFAULT_YEAR_RANGE, FilterState, filtered_indices,
};
use crate::data::model::{Boat, BoatCollection, PricePoint};
use crate::data::source::{self, FileSource, RecordSource};

/// Fallback bounds for unparseable year text, matching the slider range.
pub const YEAR_INPUT_FALLBACK: (i64, i64) = (1980, 2026);

// ---------------------------------------------------------------------------
// Deferred filter commits
// ---------------------------------------------------------------------------

/// Latest-wins single-slot queue with a trailing-edge deadline.
///
/// Each `push` replaces the held value and moves the deadline to
/// `now + delay`, so a burst of updates collapses into the last one.
#[derive(Debug, Clone)]
pub struct PendingUpdate<T> {
    value: Option<T>,
    deadline: Option<Instant>,
    delay: Duration,
}

impl<T> PendingUpdate<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            value: None,
            deadline: None,
            delay,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.value = Some(value);
        self.deadline = Some(now + self.delay);
    }

    /// Take the value if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if deadline <= now => self.take(),
            _ => None,
        }
    }

    /// Take the value regardless of the deadline.
    pub fn take(&mut self) -> Option<T> {
        self.deadline = None;
        self.value.take()
    }

    /// Edit the held value in place, keeping its deadline.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.value.is_some()
    }
}

// ---------------------------------------------------------------------------
// Range input buffer
// ---------------------------------------------------------------------------

/// Uncommitted echo of a range control: the slider position and the two
/// text boxes. Edits stay local until the widget commits them (slider
/// release, text box losing focus).
#[derive(Debug, Clone)]
pub struct RangeInput<T> {
    pub value: (T, T),
    pub text: [String; 2],
}

impl<T: Copy + Display + FromStr + PartialOrd> RangeInput<T> {
    pub fn new(value: (T, T)) -> Self {
        Self {
            value,
            text: [value.0.to_string(), value.1.to_string()],
        }
    }

    /// Overwrite the buffer with a committed range (e.g. after reset).
    pub fn sync(&mut self, value: (T, T)) {
        *self = Self::new(value);
    }

    /// Parse one text box (0 = lower, 1 = upper) into the buffer and return
    /// the resulting range. Unparseable text commits `fallback`. The result is
    /// clamped to `limits` and to the other bound, so it always fits the
    /// slider that echoes it.
    pub fn commit_text(&mut self, bound: usize, fallback: T, limits: (T, T)) -> (T, T) {
        let parsed = self.text[bound].trim().parse::<T>().unwrap_or(fallback);
        if bound == 0 {
            self.value.0 = clamp_partial(parsed, limits.0, self.value.1);
        } else {
            self.value.1 = clamp_partial(parsed, self.value.0, limits.1);
        }
        self.sync(self.value);
        self.value
    }
}

/// Clamp for partially ordered values; unordered input (NaN) maps to `lo`.
fn clamp_partial<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    match (value.partial_cmp(&lo), value.partial_cmp(&hi)) {
        (Some(Ordering::Less) | None, _) => lo,
        (_, Some(Ordering::Greater) | None) => hi,
        _ => value,
    }
}

// ---------------------------------------------------------------------------
// Derived snapshot
// ---------------------------------------------------------------------------

/// Everything derived from (collection, committed filters). All consumers in
/// a frame read the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Indices into the collection of listings passing the filters.
    pub indices: Vec<usize>,
    pub kpis: Kpis,
    pub scatter: Vec<ScatterPoint>,
    pub histogram: [usize; 5],
}

impl Snapshot {
    pub fn compute(collection: &BoatCollection, filters: &FilterState) -> Self {
        let indices = filtered_indices(collection.boats(), filters);
        let subset: Vec<&Boat> = indices.iter().filter_map(|&i| collection.get(i)).collect();
        Snapshot {
            kpis: aggregate::compute_kpis(&subset),
            scatter: aggregate::scatter_points(&subset),
            histogram: aggregate::price_histogram(&subset),
            indices,
        }
    }
}

/// Read-only view handed to the renderers.
pub struct DashboardView<'a> {
    pub collection: &'a BoatCollection,
    pub snapshot: &'a Snapshot,
    pub color_map: &'a ColorMap,
}

impl DashboardView<'_> {
    pub fn visible_boats(&self) -> impl Iterator<Item = (usize, &Boat)> + '_ {
        self.snapshot
            .indices
            .iter()
            .filter_map(move |&i| self.collection.get(i).map(|b| (i, b)))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where listings come from (None until configured or a file is opened).
    pub source: Option<Arc<dyn RecordSource>>,

    /// Listings of the current session, read-only once fetched.
    pub collection: BoatCollection,

    /// Filters as shown by the widgets; updated immediately on input.
    pub draft: FilterState,

    /// Filters driving the engines; follows `draft` after the debounce.
    pub committed: FilterState,

    pending: PendingUpdate<FilterState>,

    pub year_input: RangeInput<i64>,
    pub length_input: RangeInput<f64>,
    pub builder_search: String,
    pub model_search: String,

    /// Facet option lists for the sidebar.
    pub available_builders: Vec<String>,
    pub available_models: Vec<String>,

    snapshot: Snapshot,
    stale: bool,

    /// Per-builder colours for the scatter plot.
    pub color_map: ColorMap,

    /// Index of the listing whose price history is shown.
    pub selected: Option<usize>,
    pub price_history: Vec<PricePoint>,
    /// In-flight background history fetch, tagged with the listing index.
    history_rx: Option<mpsc::Receiver<(usize, Vec<PricePoint>)>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_DEBOUNCE)
    }
}

impl AppState {
    pub fn new(debounce: Duration) -> Self {
        let filters = FilterState::default();
        Self {
            source: None,
            collection: BoatCollection::default(),
            draft: filters.clone(),
            committed: filters,
            pending: PendingUpdate::new(debounce),
            year_input: RangeInput::new(DEFAULT_YEAR_RANGE),
            length_input: RangeInput::new(DEFAULT_LENGTH_RANGE),
            builder_search: String::new(),
            model_search: String::new(),
            available_builders: Vec::new(),
            available_models: Vec::new(),
            snapshot: Snapshot::default(),
            stale: true,
            color_map: ColorMap::default(),
            selected: None,
            price_history: Vec::new(),
            history_rx: None,
            status_message: None,
        }
    }

    // -- Data ---------------------------------------------------------------

    /// Ingest a newly fetched collection and rebuild facets and colours.
    pub fn set_collection(&mut self, collection: BoatCollection) {
        self.available_builders = facet::available_builders(collection.boats());
        self.color_map = ColorMap::new(&self.available_builders);
        log::debug!("Assigned colours to {} builders", self.color_map.len());
        self.collection = collection;
        self.clear_selection();
        self.refresh_models();
        let committed_models =
            facet::available_models(self.collection.boats(), &self.committed.builders);
        facet::retain_available(&mut self.committed.models, &committed_models);
        // A change queued before the reload must not resurrect dropped models.
        if let Some(queued) = self.pending.value_mut() {
            let queued_models = facet::available_models(self.collection.boats(), &queued.builders);
            facet::retain_available(&mut queued.models, &queued_models);
        }
        self.stale = true;
    }

    /// Fetch from the current source, replacing the collection. Failures
    /// leave an empty collection and a status message.
    pub fn reload(&mut self) {
        let Some(source) = &self.source else {
            self.status_message = Some("No data source configured (File → Open…)".to_string());
            return;
        };
        let collection = source::load_or_empty(source.as_ref());
        self.status_message = if collection.is_empty() {
            Some(format!("No listings loaded from {}", source.describe()))
        } else {
            None
        };
        self.set_collection(collection);
    }

    /// Switch to a local snapshot file and load it.
    pub fn open_file(&mut self, path: PathBuf) {
        self.source = Some(Arc::new(FileSource::new(path)));
        self.reload();
    }

    /// Show the listing at `idx` and fetch its price history on a worker
    /// thread; [`AppState::poll_history`] picks the result up.
    pub fn select_boat(&mut self, idx: usize) {
        let Some(boat) = self.collection.get(idx) else {
            return;
        };
        self.selected = Some(idx);
        self.price_history.clear();
        self.history_rx = None;

        let Some(source) = self.source.clone() else {
            return;
        };
        let boat_id = boat.id.clone();
        let (tx, rx) = mpsc::channel();
        self.history_rx = Some(rx);
        std::thread::spawn(move || {
            let history = source::history_or_empty(source.as_ref(), &boat_id);
            // The receiver is gone if the selection changed meanwhile.
            let _ = tx.send((idx, history));
        });
    }

    /// Collect a finished history fetch without blocking. Returns true when
    /// new history arrived.
    pub fn poll_history(&mut self) -> bool {
        let Some(rx) = &self.history_rx else {
            return false;
        };
        match rx.try_recv() {
            Ok((idx, history)) => {
                self.history_rx = None;
                if self.selected != Some(idx) {
                    return false;
                }
                log::debug!("Received {} price points for listing {idx}", history.len());
                self.price_history = history;
                true
            }
            Err(mpsc::TryRecvError::Empty) => false,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.history_rx = None;
                false
            }
        }
    }

    /// Whether a price-history fetch is still running.
    pub fn is_loading_history(&self) -> bool {
        self.history_rx.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.price_history.clear();
        self.history_rx = None;
    }

    pub fn selected_boat(&self) -> Option<&Boat> {
        self.selected.and_then(|i| self.collection.get(i))
    }

    // -- Filter surface -----------------------------------------------------

    /// Toggle a builder. Model selections no longer offered are dropped.
    pub fn toggle_builder(&mut self, builder: &str, now: Instant) {
        self.draft.toggle_builder(builder);
        self.refresh_models();
        self.schedule(now);
    }

    pub fn toggle_model(&mut self, model: &str, now: Instant) {
        self.draft.toggle_model(model);
        self.schedule(now);
    }

    pub fn set_year_range(&mut self, range: (i64, i64), now: Instant) {
        self.draft.set_year_range(range.0, range.1);
        self.year_input.sync(range);
        self.schedule(now);
    }

    pub fn set_length_range(&mut self, range: (f64, f64), now: Instant) {
        self.draft.set_length_range(range.0, range.1);
        self.length_input.sync(range);
        self.schedule(now);
    }

    pub fn toggle_sold(&mut self, now: Instant) {
        self.draft.toggle_sold();
        self.schedule(now);
    }

    /// Restore default filters, applied immediately.
    pub fn reset_filters(&mut self) {
        self.draft.reset();
        self.pending.take();
        self.year_input.sync(self.draft.year_range);
        self.length_input.sync(self.draft.length_range);
        self.refresh_models();
        self.commit(self.draft.clone());
    }

    fn refresh_models(&mut self) {
        self.available_models = facet::available_models(self.collection.boats(), &self.draft.builders);
        if facet::retain_available(&mut self.draft.models, &self.available_models) {
            log::debug!("Dropped model selections no longer offered");
        }
    }

    // -- Deferred commit ----------------------------------------------------

    fn schedule(&mut self, now: Instant) {
        self.pending.push(self.draft.clone(), now);
    }

    /// Commit the pending filters if their quiet period has elapsed.
    /// Returns true when the committed filters changed.
    pub fn flush_pending(&mut self, now: Instant) -> bool {
        match self.pending.take_due(now) {
            Some(filters) => self.commit(filters),
            None => false,
        }
    }

    /// Whether a filter change is waiting for its quiet period to end.
    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// When the pending filters become due, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    fn commit(&mut self, filters: FilterState) -> bool {
        if filters == self.committed {
            return false;
        }
        log::debug!("Applying filters {filters:?}");
        self.committed = filters;
        self.stale = true;
        true
    }

    // -- Derived data -------------------------------------------------------

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Current derived data, recomputed first if the inputs changed.
    pub fn view(&mut self) -> DashboardView<'_> {
        if self.stale {
            self.snapshot = Snapshot::compute(&self.collection, &self.committed);
            self.stale = false;
        }
        DashboardView {
            collection: &self.collection,
            snapshot: &self.snapshot,
            color_map: &self.color_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(150);

    fn boat(id: &str, builder: &str, model: &str, year: i64, price: f64, sold: bool) -> Boat {
        Boat {
            id: id.to_string(),
            builder: builder.to_string(),
            model: model.to_string(),
            year_built: Some(year),
            length: Some(12.0),
            price_eur: Some(price),
            is_sold: sold,
            ..Default::default()
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(DEBOUNCE);
        state.set_collection(BoatCollection::new(vec![
            boat("1", "Princess", "V50", 2015, 600_000.0, false),
            boat("2", "Princess", "F45", 2019, 900_000.0, false),
            boat("3", "Azimut", "S6", 2012, 450_000.0, true),
            boat("4", "Riva", "Iseo", 2020, 1_500_000.0, false),
        ]));
        state
    }

    #[test]
    fn pending_update_is_latest_wins_after_quiet_period() {
        let t0 = Instant::now();
        let mut pending = PendingUpdate::new(DEBOUNCE);
        pending.push(1, t0);
        pending.push(2, t0 + Duration::from_millis(100));
        // The second push moved the deadline.
        assert_eq!(pending.take_due(t0 + Duration::from_millis(200)), None);
        assert_eq!(pending.take_due(t0 + Duration::from_millis(250)), Some(2));
        assert!(!pending.is_pending());
        assert_eq!(pending.take_due(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn range_input_commits_text_with_fallback() {
        let mut input = RangeInput::new((1990_i64, 2026_i64));
        input.text[0] = " 2001 ".to_string();
        assert_eq!(input.commit_text(0, 1980, YEAR_INPUT_FALLBACK), (2001, 2026));
        input.text[1] = "abc".to_string();
        assert_eq!(input.commit_text(1, 2026, YEAR_INPUT_FALLBACK), (2001, 2026));
        assert_eq!(input.text[1], "2026");

        let mut length = RangeInput::new((0.0_f64, 100.0_f64));
        length.text[1] = "24.5".to_string();
        assert_eq!(length.commit_text(1, 100.0, DEFAULT_LENGTH_RANGE), (0.0, 24.5));
    }

    #[test]
    fn range_input_clamps_typed_values_to_slider_limits() {
        let mut input = RangeInput::new((1990_i64, 2026_i64));
        input.text[0] = "1950".to_string();
        assert_eq!(input.commit_text(0, 1980, YEAR_INPUT_FALLBACK), (1980, 2026));
        assert_eq!(input.text[0], "1980");
        input.text[1] = "2100".to_string();
        assert_eq!(input.commit_text(1, 2026, YEAR_INPUT_FALLBACK), (1980, 2026));
        // A lower bound past the upper one stops at it.
        input.text[0] = "2030".to_string();
        assert_eq!(input.commit_text(0, 1980, YEAR_INPUT_FALLBACK), (2026, 2026));

        let mut length = RangeInput::new((10.0_f64, 20.0_f64));
        length.text[1] = "250".to_string();
        assert_eq!(length.commit_text(1, 100.0, DEFAULT_LENGTH_RANGE), (10.0, 100.0));
        length.text[0] = "NaN".to_string();
        assert_eq!(length.commit_text(0, 0.0, DEFAULT_LENGTH_RANGE), (0.0, 100.0));
    }

    #[test]
    fn filter_changes_apply_only_after_debounce() {
        let mut state = loaded_state();
        assert_eq!(state.view().snapshot.indices, vec![0, 1, 3]);

        let t0 = Instant::now();
        state.toggle_builder("Princess", t0);
        state.toggle_sold(t0 + Duration::from_millis(50));
        // Draft echoes immediately, engines still see the old filters.
        assert!(state.draft.include_sold);
        assert!(!state.flush_pending(t0 + Duration::from_millis(100)));
        assert!(state.has_pending());
        assert!(!state.is_stale());
        assert_eq!(state.view().snapshot.indices, vec![0, 1, 3]);

        assert!(state.flush_pending(t0 + Duration::from_millis(250)));
        assert!(state.is_stale());
        assert_eq!(state.view().snapshot.indices, vec![0, 1]);
        assert!(!state.is_stale());
    }

    #[test]
    fn builder_change_drops_models_no_longer_available() {
        let mut state = loaded_state();
        let t0 = Instant::now();
        state.toggle_builder("Princess", t0);
        assert_eq!(state.available_models, vec!["F45", "V50"]);
        state.toggle_model("V50", t0);
        state.toggle_builder("Princess", t0);
        state.toggle_builder("Riva", t0);
        assert_eq!(state.available_models, vec!["Iseo"]);
        assert!(state.draft.models.is_empty());
    }

    #[test]
    fn reload_reconciles_queued_filter_change() {
        let mut state = loaded_state();
        let t0 = Instant::now();
        state.toggle_builder("Princess", t0);
        state.toggle_model("V50", t0);

        state.set_collection(BoatCollection::new(vec![boat("5", "Princess", "F45", 2021, 800_000.0, false)]));
        assert_eq!(state.available_models, vec!["F45"]);
        assert!(state.draft.models.is_empty());

        assert!(state.flush_pending(t0 + Duration::from_secs(1)));
        assert_eq!(state.committed, state.draft);
        assert_eq!(state.view().snapshot.indices, vec![0]);
    }

    #[test]
    fn reset_applies_immediately_and_syncs_inputs() {
        let mut state = loaded_state();
        let t0 = Instant::now();
        state.set_year_range((2018, 2020), t0);
        state.flush_pending(t0 + DEBOUNCE);
        assert_eq!(state.view().snapshot.indices, vec![1, 3]);

        state.set_length_range((0.0, 5.0), t0 + DEBOUNCE);
        state.reset_filters();
        assert_eq!(state.committed, FilterState::default());
        assert_eq!(state.year_input.value, DEFAULT_YEAR_RANGE);
        assert_eq!(state.length_input.text[1], "100");
        assert_eq!(state.pending_deadline(), None);
        assert_eq!(state.view().snapshot.indices, vec![0, 1, 3]);
    }

    #[test]
    fn unchanged_commit_does_not_invalidate_snapshot() {
        let mut state = loaded_state();
        let _ = state.view();
        let t0 = Instant::now();
        state.toggle_sold(t0);
        state.toggle_sold(t0);
        assert!(!state.flush_pending(t0 + DEBOUNCE));
        assert!(!state.is_stale());
    }

    #[test]
    fn snapshot_kpis_follow_committed_filters() {
        let mut state = loaded_state();
        let view = state.view();
        assert_eq!(view.snapshot.kpis.total, 3);
        assert_eq!(view.snapshot.kpis.total_value, 3_000_000.0);
        assert_eq!(view.snapshot.kpis.top_builder.as_deref(), Some("Princess"));
        assert_eq!(view.snapshot.histogram, [0, 0, 2, 1, 0]);
        assert_eq!(view.snapshot.scatter.len(), 3);
        let ids: Vec<&str> = view.visible_boats().map(|(_, b)| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn empty_session_is_a_valid_state() {
        let mut state = AppState::new(DEBOUNCE);
        state.reload();
        assert!(state.status_message.is_some());
        let view = state.view();
        assert!(view.snapshot.indices.is_empty());
        assert_eq!(view.snapshot.kpis, Kpis::default());
        assert_eq!(view.snapshot.histogram, [0; 5]);
        assert!(view.snapshot.scatter.is_empty());
    }

    struct HistorySource;

    impl RecordSource for HistorySource {
        fn describe(&self) -> String {
            "history".to_string()
        }

        fn fetch_boats(&self) -> crate::error::Result<Vec<Boat>> {
            Ok(vec![boat("1", "Princess", "V50", 2015, 600_000.0, false)])
        }

        fn price_history(&self, boat_id: &str) -> crate::error::Result<Vec<PricePoint>> {
            Ok(vec![PricePoint {
                boat_id: boat_id.to_string(),
                price_eur: Some(590_000.0),
                recorded_at: Some("2026-01-01".to_string()),
            }])
        }
    }

    fn wait_for_history(state: &mut AppState) -> bool {
        let give_up = Instant::now() + Duration::from_secs(5);
        while Instant::now() < give_up {
            if state.poll_history() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn price_history_arrives_from_worker_thread() {
        let mut state = AppState::new(DEBOUNCE);
        state.source = Some(Arc::new(HistorySource));
        state.reload();
        state.select_boat(0);
        assert!(state.is_loading_history());
        assert!(wait_for_history(&mut state));
        assert!(!state.is_loading_history());
        assert_eq!(state.price_history.len(), 1);
        assert_eq!(state.price_history[0].boat_id, "1");
    }

    #[test]
    fn cleared_selection_discards_history_in_flight() {
        let mut state = AppState::new(DEBOUNCE);
        state.source = Some(Arc::new(HistorySource));
        state.reload();
        state.select_boat(0);
        state.clear_selection();
        assert!(!state.is_loading_history());
        assert!(!state.poll_history());
        assert!(state.price_history.is_empty());
    }

    #[test]
    fn selecting_without_source_has_empty_history() {
        let mut state = loaded_state();
        state.select_boat(2);
        assert_eq!(state.selected_boat().map(|b| b.id.as_str()), Some("3"));
        assert!(state.price_history.is_empty());
        state.select_boat(99);
        assert_eq!(state.selected, Some(2));
        state.clear_selection();
        assert!(state.selected_boat().is_none());
    }
}
