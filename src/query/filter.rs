use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, warn};

use super::period::{self, Period, TimeRange};
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, Field};

/// Shift shorthands accepted by the `shift` parameter.
const MORNING_SHIFT: &str = "Ca 1";
const AFTERNOON_SHIFT: &str = "Ca 2";

/// Raw filter parameters of one request, before interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub period: Period,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub shift: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Inclusive timestamp window.
    Between {
        field: Field,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Case-insensitive substring match.
    Contains { field: Field, needle: String },
    /// At least one of the inner predicates holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        match self {
            Predicate::Between { field, start, end } => {
                let instant = match field {
                    Field::CheckinTime => record.checkin_time,
                    _ => None,
                };
                instant.is_some_and(|t| t >= *start && t <= *end)
            }
            Predicate::Contains { field, needle } => record
                .text(*field)
                .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase())),
            Predicate::Any(inner) => inner.iter().any(|p| p.matches(record)),
        }
    }
}

/// Conjunction of predicates; empty means every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub clauses: Vec<Predicate>,
}

impl AttendanceFilter {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.clauses.iter().all(|p| p.matches(record))
    }

    /// The check-in window, if one was applied.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.clauses.iter().find_map(|p| match p {
            Predicate::Between {
                field: Field::CheckinTime,
                start,
                end,
            } => Some((*start, *end)),
            _ => None,
        })
    }
}

/// Fixed set of fields returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<Field>);

impl Projection {
    /// Fields shown by the JSON endpoint.
    pub fn list_view() -> Self {
        Self(vec![
            Field::EmployeeId,
            Field::EmployeeName,
            Field::Address,
            Field::ProjectId,
            Field::Tasks,
            Field::OtherNote,
            Field::CheckinTime,
            Field::Shift,
            Field::Status,
            Field::FaceImage,
        ])
    }

    /// Same as the list view minus the face image.
    pub fn export_view() -> Self {
        let mut fields = Self::list_view().0;
        fields.retain(|f| *f != Field::FaceImage);
        Self(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }
}

/// Everything the record store needs to answer one request. Stores return
/// matches newest check-in first.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceQuery {
    pub filter: AttendanceFilter,
    pub projection: Projection,
}

/// Turns request parameters into an [`AttendanceQuery`].
///
/// Lenient by default: a custom range that cannot be applied simply adds no
/// time predicate. With `strict_dates` such a range is rejected instead.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    pub offset: FixedOffset,
    pub strict_dates: bool,
}

impl QueryBuilder {
    pub fn new(offset: FixedOffset, strict_dates: bool) -> Self {
        Self {
            offset,
            strict_dates,
        }
    }

    pub fn build(
        &self,
        request: &FilterRequest,
        projection: Projection,
        now: DateTime<Utc>,
    ) -> Result<AttendanceQuery, AppError> {
        let mut clauses = Vec::new();

        if let Some(range) = self.time_range(request, now)? {
            clauses.push(Predicate::Between {
                field: Field::CheckinTime,
                start: range.start_utc(),
                end: range.end_utc(),
            });
        }

        if let Some(search) = non_blank(request.search.as_deref()) {
            clauses.push(Predicate::Any(vec![
                Predicate::Contains {
                    field: Field::EmployeeName,
                    needle: search.to_string(),
                },
                Predicate::Contains {
                    field: Field::EmployeeId,
                    needle: search.to_string(),
                },
            ]));
        }

        if let Some(shift) = non_blank(request.shift.as_deref()) {
            clauses.push(Predicate::Contains {
                field: Field::Shift,
                needle: shift_needle(shift).to_string(),
            });
        }

        debug!(?request, clauses = clauses.len(), "Built attendance filter");

        Ok(AttendanceQuery {
            filter: AttendanceFilter { clauses },
            projection,
        })
    }

    fn time_range(
        &self,
        request: &FilterRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<TimeRange>, AppError> {
        let now = now.with_timezone(&self.offset);

        let range = match request.period {
            Period::Custom => {
                match period::custom_range(
                    request.start_date.as_deref(),
                    request.end_date.as_deref(),
                    self.offset,
                ) {
                    Ok(range) => range,
                    Err(problem) if self.strict_dates => {
                        return Err(AppError::Validation(problem.to_string()));
                    }
                    Err(problem) => {
                        warn!(%problem, "Ignoring custom date range");
                        None
                    }
                }
            }
            Period::Week => period::current_week(now),
            Period::Month => period::current_month(now),
            Period::Year => period::current_year(now),
            Period::All => None,
        };

        Ok(range)
    }
}

/// `sang` and `chieu` select the morning and afternoon shifts; anything else
/// is matched literally.
fn shift_needle(code: &str) -> &str {
    if code.eq_ignore_ascii_case("sang") {
        MORNING_SHIFT
    } else if code.eq_ignore_ascii_case("chieu") {
        AFTERNOON_SHIFT
    } else {
        code
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(FixedOffset::east_opt(7 * 3600).unwrap(), false)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 3, 0, 0).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record_at(time: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: "A001".into(),
            checkin_time: Some(time),
            ..Default::default()
        }
    }

    fn custom(start: &str, end: &str) -> FilterRequest {
        FilterRequest {
            period: Period::Custom,
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }

    #[test]
    fn all_period_adds_no_predicate() {
        let query = builder()
            .build(&FilterRequest::default(), Projection::list_view(), now())
            .unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn custom_range_includes_last_second_and_excludes_next_day() {
        let query = builder()
            .build(&custom("2024-03-01", "2024-03-31"), Projection::list_view(), now())
            .unwrap();

        assert!(query.filter.matches(&record_at(local(2024, 3, 31, 23, 59, 59))));
        assert!(query.filter.matches(&record_at(local(2024, 3, 1, 0, 0, 0))));
        assert!(!query.filter.matches(&record_at(local(2024, 4, 1, 0, 0, 0))));
        assert!(!query.filter.matches(&record_at(local(2024, 2, 29, 23, 59, 59))));
    }

    #[test]
    fn unparseable_custom_date_degrades_to_no_time_predicate() {
        let query = builder()
            .build(&custom("not-a-date", "2024-03-31"), Projection::list_view(), now())
            .unwrap();
        assert!(query.filter.time_range().is_none());
        assert!(query.filter.is_empty());
    }

    #[test]
    fn strict_mode_rejects_unparseable_custom_date() {
        let strict = QueryBuilder::new(FixedOffset::east_opt(7 * 3600).unwrap(), true);
        let err = strict
            .build(&custom("not-a-date", "2024-03-31"), Projection::list_view(), now())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn custom_with_one_bound_adds_no_predicate_even_when_strict() {
        let strict = QueryBuilder::new(FixedOffset::east_opt(7 * 3600).unwrap(), true);
        let request = FilterRequest {
            period: Period::Custom,
            start_date: Some("2024-03-01".into()),
            ..Default::default()
        };
        let query = strict.build(&request, Projection::list_view(), now()).unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn dates_without_custom_period_are_ignored() {
        let request = FilterRequest {
            period: Period::All,
            ..custom("2024-03-01", "2024-03-31")
        };
        let query = builder().build(&request, Projection::list_view(), now()).unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn week_period_is_current_local_week() {
        let request = FilterRequest {
            period: Period::Week,
            ..Default::default()
        };
        let query = builder().build(&request, Projection::list_view(), now()).unwrap();
        let (start, end) = query.filter.time_range().unwrap();
        assert_eq!(start, local(2024, 3, 11, 0, 0, 0));
        assert_eq!(end, local(2024, 3, 17, 23, 59, 59));
    }

    #[test]
    fn search_matches_name_or_id_ignoring_case() {
        let request = FilterRequest {
            search: Some("nguyen".into()),
            ..Default::default()
        };
        let query = builder().build(&request, Projection::list_view(), now()).unwrap();

        let by_name = AttendanceRecord {
            employee_id: "B002".into(),
            employee_name: Some("Tran Thi NGUYEN".into()),
            ..Default::default()
        };
        let other = AttendanceRecord {
            employee_id: "B003".into(),
            employee_name: Some("Le Van C".into()),
            ..Default::default()
        };
        assert!(query.filter.matches(&by_name));
        assert!(!query.filter.matches(&other));

        let by_id = FilterRequest {
            search: Some("b00".into()),
            ..Default::default()
        };
        let query = builder().build(&by_id, Projection::list_view(), now()).unwrap();
        assert!(query.filter.matches(&other));
    }

    #[test]
    fn blank_search_and_shift_are_ignored() {
        let request = FilterRequest {
            search: Some("   ".into()),
            shift: Some("".into()),
            ..Default::default()
        };
        let query = builder().build(&request, Projection::list_view(), now()).unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn shift_codes_map_to_named_shifts() {
        let with_shift = |shift: &str| AttendanceRecord {
            employee_id: "A001".into(),
            shift: Some(shift.into()),
            ..Default::default()
        };
        let build = |code: &str| {
            builder()
                .build(
                    &FilterRequest {
                        shift: Some(code.into()),
                        ..Default::default()
                    },
                    Projection::list_view(),
                    now(),
                )
                .unwrap()
                .filter
        };

        let morning = build("sang");
        assert!(morning.matches(&with_shift("Ca 1 - Sáng")));
        assert!(!morning.matches(&with_shift("Ca 2 - Chiều")));

        let afternoon = build("chieu");
        assert!(afternoon.matches(&with_shift("Ca 2 - Chiều")));
        assert!(!afternoon.matches(&with_shift("Ca 1 - Sáng")));

        let literal = build("ca 3");
        assert!(literal.matches(&with_shift("Ca 3 - Tối")));
        assert!(!literal.matches(&with_shift("Ca 1 - Sáng")));
    }

    #[test]
    fn records_without_the_field_never_match() {
        let filter = builder()
            .build(&custom("2024-03-01", "2024-03-31"), Projection::list_view(), now())
            .unwrap()
            .filter;
        let undated = AttendanceRecord {
            employee_id: "A001".into(),
            ..Default::default()
        };
        assert!(!filter.matches(&undated));
    }

    #[test]
    fn building_twice_is_identical() {
        let request = FilterRequest {
            period: Period::Month,
            search: Some("an".into()),
            shift: Some("sang".into()),
            ..Default::default()
        };
        let first = builder().build(&request, Projection::list_view(), now()).unwrap();
        let second = builder().build(&request, Projection::list_view(), now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn projections_never_expose_internal_ids_and_export_hides_face_image() {
        for projection in [Projection::list_view(), Projection::export_view()] {
            assert!(projection.fields().iter().all(|f| f.column() != "id"));
            assert_eq!(projection.fields()[0], Field::EmployeeId);
        }
        assert!(Projection::list_view().fields().contains(&Field::FaceImage));
        assert!(!Projection::export_view().fields().contains(&Field::FaceImage));
    }
}
