// routes.rs - row activations on the three stat pages -> detail screen to open

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Height,
    Weight,
    BodyFat,
    Measurement(Measurement),
    Lift(Lift),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    Chest,
    Waist,
    Hips,
    Arms,
    Thighs,
    Calves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lift {
    BenchPress,
    Squat,
    Deadlift,
}

impl Measurement {
    pub fn name(self) -> &'static str {
        match self {
            Measurement::Chest => "Chest",
            Measurement::Waist => "Waist",
            Measurement::Hips => "Hips",
            Measurement::Arms => "Arms",
            Measurement::Thighs => "Thighs",
            Measurement::Calves => "Calves",
        }
    }
}

impl Lift {
    pub fn name(self) -> &'static str {
        match self {
            Lift::BenchPress => "Bench Press",
            Lift::Squat => "Squat",
            Lift::Deadlift => "Deadlift",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRoute {
    Birthday,
    Gender,
    Records(RecordKind),
    BmiInfo,
    BmrInfo,
    FfmiInfo,
}

/// `tag` disambiguates cells that share a row (chest/waist on the measurements page).
pub fn route_for_row(page: usize, section: usize, row: usize, tag: i32) -> Option<DetailRoute> {
    use DetailRoute::*;
    use RecordKind::{BodyFat, Height, Weight};

    let route = match (page, section, row) {
        (0, 0, 0) => Birthday,
        (0, 0, 1) => Gender,
        (0, 0, 2) => Records(Height),
        (0, 0, 3) => Records(Weight),
        (0, 1, 0) => BmiInfo,
        (0, 1, 1) => BmrInfo,
        (0, 2, 0) => Records(BodyFat),
        (0, 2, 1) => FfmiInfo,

        (1, 0, _) => match tag {
            0 => measurement(Measurement::Chest),
            1 => measurement(Measurement::Waist),
            _ => return None,
        },
        (1, 1, _) => measurement(Measurement::Hips),
        (1, 2, 0) => measurement(Measurement::Arms),
        (1, 2, 1) => measurement(Measurement::Thighs),
        (1, 2, 2) => measurement(Measurement::Calves),

        (2, _, 0) => lift(Lift::BenchPress),
        (2, _, 1) => lift(Lift::Squat),
        (2, _, 2) => lift(Lift::Deadlift),

        _ => return None,
    };
    Some(route)
}

fn measurement(m: Measurement) -> DetailRoute {
    DetailRoute::Records(RecordKind::Measurement(m))
}

fn lift(l: Lift) -> DetailRoute {
    DetailRoute::Records(RecordKind::Lift(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_page_rows() {
        assert_eq!(route_for_row(0, 0, 0, 0), Some(DetailRoute::Birthday));
        assert_eq!(route_for_row(0, 0, 3, 0), Some(DetailRoute::Records(RecordKind::Weight)));
        assert_eq!(route_for_row(0, 2, 1, 0), Some(DetailRoute::FfmiInfo));
        assert_eq!(route_for_row(0, 1, 5, 0), None);
    }

    #[test]
    fn measurement_tag_picks_the_cell() {
        assert_eq!(
            route_for_row(1, 0, 0, 1),
            Some(DetailRoute::Records(RecordKind::Measurement(Measurement::Waist)))
        );
        assert_eq!(route_for_row(1, 0, 0, 7), None);
        assert_eq!(
            route_for_row(1, 1, 3, 0),
            Some(DetailRoute::Records(RecordKind::Measurement(Measurement::Hips)))
        );
    }

    #[test]
    fn lift_rows_ignore_section() {
        assert_eq!(
            route_for_row(2, 4, 2, 0),
            Some(DetailRoute::Records(RecordKind::Lift(Lift::Deadlift)))
        );
        assert_eq!(route_for_row(3, 0, 0, 0), None);
    }
}
