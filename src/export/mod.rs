use chrono::{FixedOffset, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::model::attendance::{AttendanceRecord, Field};
use crate::query::filter::AttendanceFilter;
use crate::query::{FilterRequest, Period};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "ChamCong";
const COLUMN_WIDTH: f64 = 22.0;

/// Spreadsheet columns and their display names.
pub const EXPORT_COLUMNS: &[(Field, &str)] = &[
    (Field::EmployeeId, "Mã NV"),
    (Field::EmployeeName, "Tên nhân viên"),
    (Field::Address, "Địa chỉ"),
    (Field::ProjectId, "Mã dự án"),
    (Field::Tasks, "Công việc"),
    (Field::OtherNote, "Ghi chú khác"),
    (Field::CheckinTime, "Thời gian check-in"),
    (Field::Shift, "Ca làm"),
    (Field::Status, "Trạng thái"),
];

/// Render records into an xlsx workbook, one row per record.
pub fn format_for_export(
    records: &[AttendanceRecord],
    columns: &[(Field, &str)],
    offset: FixedOffset,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (_, title)) in columns.iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, COLUMN_WIDTH)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, (field, _)) in columns.iter().enumerate() {
                if let Some(value) = cell_text(record, *field, offset) {
                    sheet.write_string(row, col as u16, value)?;
                }
            }
        }

        sheet.set_freeze_panes(1, 0)?;
    }

    workbook.save_to_buffer()
}

fn cell_text(record: &AttendanceRecord, field: Field, offset: FixedOffset) -> Option<String> {
    match field {
        Field::CheckinTime => record.checkin_time.map(|t| {
            t.with_timezone(&offset)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string()
        }),
        other => record.text(other),
    }
}

/// `<prefix>_<range-or-period>_<YYYYMMDD>.xlsx`
///
/// The range part is `<start>_<end>` when a custom range was applied, the
/// period name otherwise; a custom range that was dropped reads as `all`.
pub fn export_filename(
    prefix: &str,
    request: &FilterRequest,
    filter: &AttendanceFilter,
    offset: FixedOffset,
    today: NaiveDate,
) -> String {
    let scope = match (request.period, filter.time_range()) {
        (Period::Custom, Some((start, end))) => format!(
            "{}_{}",
            start.with_timezone(&offset).format("%Y-%m-%d"),
            end.with_timezone(&offset).format("%Y-%m-%d")
        ),
        (Period::Custom, None) => Period::All.as_ref().to_string(),
        (period, _) => period.as_ref().to_string(),
    };

    format!("{}_{}_{}.xlsx", prefix, scope, today.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::{Projection, QueryBuilder};
    use chrono::{TimeZone, Utc};

    fn ict() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    fn filter_for(request: &FilterRequest) -> AttendanceFilter {
        QueryBuilder::new(ict(), false)
            .build(request, Projection::export_view(), Utc::now())
            .unwrap()
            .filter
    }

    #[test]
    fn filename_for_custom_range() {
        let request = FilterRequest {
            period: Period::Custom,
            start_date: Some("2024-03-01".into()),
            end_date: Some("2024-03-31".into()),
            ..Default::default()
        };
        assert_eq!(
            export_filename("attendance", &request, &filter_for(&request), ict(), today()),
            "attendance_2024-03-01_2024-03-31_20240402.xlsx"
        );
    }

    #[test]
    fn filename_for_named_periods() {
        for (period, expected) in [
            (Period::All, "attendance_all_20240402.xlsx"),
            (Period::Week, "attendance_week_20240402.xlsx"),
            (Period::Month, "attendance_month_20240402.xlsx"),
            (Period::Year, "attendance_year_20240402.xlsx"),
        ] {
            let request = FilterRequest {
                period,
                ..Default::default()
            };
            assert_eq!(
                export_filename("attendance", &request, &filter_for(&request), ict(), today()),
                expected
            );
        }
    }

    #[test]
    fn filename_for_dropped_custom_range_reads_all() {
        let request = FilterRequest {
            period: Period::Custom,
            start_date: Some("not-a-date".into()),
            end_date: Some("2024-03-31".into()),
            ..Default::default()
        };
        assert_eq!(
            export_filename("bao_cao", &request, &filter_for(&request), ict(), today()),
            "bao_cao_all_20240402.xlsx"
        );
    }

    #[test]
    fn cells_use_local_time_and_joined_tasks() {
        let record = AttendanceRecord {
            employee_id: "A001".into(),
            tasks: Some(vec!["Survey".into(), "Report".into()]),
            checkin_time: Some(Utc.with_ymd_and_hms(2024, 3, 31, 16, 59, 59).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            cell_text(&record, Field::CheckinTime, ict()).as_deref(),
            Some("31/03/2024 23:59:59")
        );
        assert_eq!(
            cell_text(&record, Field::Tasks, ict()).as_deref(),
            Some("Survey, Report")
        );
        assert_eq!(cell_text(&record, Field::Address, ict()), None);
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let records = vec![AttendanceRecord {
            employee_id: "A001".into(),
            employee_name: Some("Nguyen Van A".into()),
            ..Default::default()
        }];
        let bytes = format_for_export(&records, EXPORT_COLUMNS, ict()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn export_columns_never_include_face_image() {
        assert!(EXPORT_COLUMNS.iter().all(|(f, _)| *f != Field::FaceImage));
    }
}
