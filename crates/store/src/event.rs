/// Emitted once per store mutation that changed something.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    ModeChanged,
    DisplayInfoChanged,
    SourceChanged,
    BoundingBoxChanged,
    BoundingBoxDrawingChanged,
    StopsAndRoutesChanged,
    TrafficFlowChanged,
    ClusteringChanged,
    FocusedEntityChanged,
    SelectedEntityChanged,
    HighlightedEntityChanged,
    ShowAllChanged,
    FetchInfoChanged,
}
