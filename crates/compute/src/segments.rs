use model::route::GeometryPoint;

/// Constant-speed run of a route polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSegment {
    /// `[lon, lat]` vertices. Consecutive segments share their boundary vertex.
    pub points: Vec<[f64; 2]>,
    /// Speed of the run in km/h, `None` past the end of the flow array.
    pub speed: Option<f64>,
}

/// Splits `geometry` into runs of equal interval speed.
///
/// The interval counter starts at 0 and advances whenever a step arrives at a
/// stop-position vertex; `flow[counter]` is the speed of the step. The first
/// step that leaves the stop-position at interval `final_stop_order` only
/// extends the current run: it keeps the running speed and does not advance
/// the counter. Later steps from that interval read `flow[final_stop_order]`.
///
/// Dropping the first point of every segment after the first and concatenating
/// yields `geometry` exactly.
pub fn merge_segments(
    geometry: &[GeometryPoint],
    flow: &[f64],
    final_stop_order: Option<usize>,
) -> Vec<TrafficSegment> {
    let Some(first) = geometry.first() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut interval = 0usize;
    let mut buffer = vec![first.position()];
    let mut last_speed = flow.first().copied();
    let mut boundary_crossed = false;

    for step in geometry.windows(2) {
        let (from, to) = (&step[0], &step[1]);

        if !boundary_crossed && from.is_stop_position() && final_stop_order == Some(interval) {
            boundary_crossed = true;
            buffer.push(to.position());
            continue;
        }

        let speed = flow.get(interval).copied();
        if speed == last_speed {
            buffer.push(to.position());
        } else {
            out.push(TrafficSegment {
                points: std::mem::replace(&mut buffer, vec![from.position(), to.position()]),
                speed: last_speed,
            });
            last_speed = speed;
        }

        if to.is_stop_position() {
            interval += 1;
        }
    }

    out.push(TrafficSegment {
        points: buffer,
        speed: last_speed,
    });
    out
}
