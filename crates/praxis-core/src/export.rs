use crate::dashboard::DashboardStats;
use chrono::NaiveDate;
use praxis_db::{enrollment, final_assignment, final_assignment_result, lab_participation, lab_report, lab_report_grade, lab_session};
use praxis_entity::{course, course_semester};
use sea_orm::{ActiveEnum, DatabaseConnection, DbErr};
use std::collections::HashMap;
use uuid::Uuid;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Lenient parse of the `format` query value; anything unknown is CSV.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }
}

/// A rendered download: payload plus the headers the response needs.
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The course selector as it appears in the download filename.
pub fn course_selector(selected: Option<i32>) -> String {
    selected.map_or_else(|| "all".to_owned(), |id| id.to_string())
}

pub fn render_dashboard_export(
    stats: &DashboardStats,
    days: u16,
    selected: Option<i32>,
    format: ExportFormat,
) -> Export {
    let base = format!("dashboard_stats_d{days}_c{}", course_selector(selected));
    let workbook = match format {
        ExportFormat::Xlsx => dashboard_workbook(stats),
        ExportFormat::Csv => None,
    };
    assemble(base, format, workbook, dashboard_csv(stats))
}

pub fn render_offering_export(data: &OfferingExportData, format: ExportFormat) -> Export {
    let base = format!("course_semester_{}", data.course_semester_id);
    let workbook = match format {
        ExportFormat::Xlsx => offering_workbook(data),
        ExportFormat::Csv => None,
    };
    assemble(base, format, workbook, offering_csv(data))
}

/// Picks the payload for the requested format. A missing workbook means the
/// spreadsheet capability is unavailable; the export silently degrades to
/// CSV instead of failing.
fn assemble(base: String, format: ExportFormat, workbook: Option<Vec<u8>>, csv: String) -> Export {
    match (format, workbook) {
        (ExportFormat::Xlsx, Some(bytes)) => Export {
            filename: format!("{base}.xlsx"),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        },
        (ExportFormat::Xlsx, None) | (ExportFormat::Csv, _) => Export {
            filename: format!("{base}.csv"),
            content_type: CSV_CONTENT_TYPE,
            bytes: csv.into_bytes(),
        },
    }
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn format_grade(grade: Option<i32>) -> String {
    grade.map(|g| g.to_string()).unwrap_or_default()
}

fn format_avg(avg: Option<f64>) -> String {
    avg.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn dashboard_csv(stats: &DashboardStats) -> String {
    let mut out = String::from(UTF8_BOM);
    out.push_str("key,value\n");
    out.push_str(&format!("active_courses,{}\n", stats.active_courses));
    out.push_str(&format!("unique_students,{}\n", stats.unique_students));
    out.push_str(&format!("upcoming_labs,{}\n", stats.upcoming_labs));
    out.push_str(&format!("lab_grades_done,{}\n", stats.lab_grades_done));
    out.push_str(&format!("lab_grades_null,{}\n", stats.lab_grades_null));
    out.push_str(&format!("fa_submitted,{}\n", stats.fa_submitted));
    out.push_str(&format!("fa_graded,{}\n", stats.fa_graded));
    out.push_str(&format!("fa_avg,{}\n", format_avg(stats.fa_avg)));
    out.push_str(&format!("overdue_ungraded,{}\n", stats.overdue_ungraded));
    out.push_str(&format!("no_attendance_sessions,{}\n", stats.no_attendance_sessions));
    out.push('\n');
    out.push_str("course_code,course_title,year,students,upcoming_sessions,lab_done,lab_null,fa_sub,fa_grd\n");
    for row in &stats.per_course {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            escape_csv(&row.course_code),
            escape_csv(&row.course_title),
            row.year,
            row.students,
            row.upcoming_sessions,
            row.lab_done,
            row.lab_null,
            row.fa_submitted,
            row.fa_graded,
        ));
    }
    out
}

#[cfg(feature = "xlsx")]
fn dashboard_workbook(stats: &DashboardStats) -> Option<Vec<u8>> {
    match build_dashboard_workbook(stats) {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::warn!(error = &error as &dyn std::error::Error, "workbook rendering failed, falling back to csv");
            None
        }
    }
}

#[cfg(not(feature = "xlsx"))]
fn dashboard_workbook(_stats: &DashboardStats) -> Option<Vec<u8>> {
    None
}

#[cfg(feature = "xlsx")]
fn build_dashboard_workbook(stats: &DashboardStats) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name("summary")?;
    summary.write_string(0, 0, "key")?;
    summary.write_string(0, 1, "value")?;
    let scalars: [(&str, f64); 9] = [
        ("active_courses", stats.active_courses as f64),
        ("unique_students", stats.unique_students as f64),
        ("upcoming_labs", stats.upcoming_labs as f64),
        ("lab_grades_done", stats.lab_grades_done as f64),
        ("lab_grades_null", stats.lab_grades_null as f64),
        ("fa_submitted", stats.fa_submitted as f64),
        ("fa_graded", stats.fa_graded as f64),
        ("overdue_ungraded", stats.overdue_ungraded as f64),
        ("no_attendance_sessions", stats.no_attendance_sessions as f64),
    ];
    let mut row = 1;
    for (key, value) in scalars {
        summary.write_string(row, 0, key)?;
        summary.write_number(row, 1, value)?;
        row += 1;
    }
    summary.write_string(row, 0, "fa_avg")?;
    match stats.fa_avg {
        Some(avg) => {
            summary.write_number(row, 1, avg)?;
        }
        None => {
            summary.write_string(row, 1, "")?;
        }
    }

    let per_offering = workbook.add_worksheet();
    per_offering.set_name("per-offering")?;
    let headers = [
        "course_code",
        "course_title",
        "year",
        "students",
        "upcoming_sessions",
        "lab_done",
        "lab_null",
        "fa_sub",
        "fa_grd",
    ];
    for (col, header) in headers.iter().enumerate() {
        per_offering.write_string(0, col as u16, *header)?;
    }
    for (index, entry) in stats.per_course.iter().enumerate() {
        let row = (index + 1) as u32;
        per_offering.write_string(row, 0, &entry.course_code)?;
        per_offering.write_string(row, 1, &entry.course_title)?;
        per_offering.write_number(row, 2, f64::from(entry.year))?;
        per_offering.write_number(row, 3, entry.students as f64)?;
        per_offering.write_number(row, 4, entry.upcoming_sessions as f64)?;
        per_offering.write_number(row, 5, entry.lab_done as f64)?;
        per_offering.write_number(row, 6, entry.lab_null as f64)?;
        per_offering.write_number(row, 7, entry.fa_submitted as f64)?;
        per_offering.write_number(row, 8, entry.fa_graded as f64)?;
    }

    let trend = workbook.add_worksheet();
    trend.set_name("trend")?;
    trend.write_string(0, 0, "week")?;
    trend.write_string(0, 1, "graded")?;
    for (index, value) in stats.attendance_trend.iter().enumerate() {
        let row = (index + 1) as u32;
        trend.write_number(row, 0, (index + 1) as f64)?;
        trend.write_number(row, 1, *value as f64)?;
    }

    workbook.save_to_buffer()
}

/// Session-level detail of one offering, flattened for export.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferingExportData {
    pub course_semester_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub year: i32,
    pub semester: String,
    pub sessions: Vec<SessionRow>,
    pub participations: Vec<ParticipationRow>,
    pub lab_grades: Vec<LabGradeRow>,
    pub final_assignment: Vec<FinalResultRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub week: i32,
    pub name: String,
    pub date: NaiveDate,
    pub present_count: u64,
    pub graded_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRow {
    pub week: i32,
    pub student: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabGradeRow {
    pub week: i32,
    pub student: String,
    pub grade: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalResultRow {
    pub student: String,
    pub submitted: bool,
    pub grade: Option<i32>,
}

/// Collects everything the course-scoped export renders: per-session
/// attendance/grade counts, then the raw participation, grade and final
/// result rows.
pub async fn load_offering_export(
    db: &DatabaseConnection,
    offering: &course_semester::Model,
    course: &course::Model,
) -> Result<OfferingExportData, DbErr> {
    let sessions = lab_session::Query::list_for(db, offering.id).await?;
    let session_ids: Vec<i32> = sessions.iter().map(|s| s.id).collect();
    let reports = lab_report::Query::for_sessions(db, &session_ids).await?;
    let report_ids: Vec<i32> = reports.iter().map(|r| r.id).collect();
    let participations = lab_participation::Query::for_sessions(db, &session_ids).await?;
    let grades = lab_report_grade::Query::for_reports(db, &report_ids).await?;

    let students = enrollment::Query::list_students(db, offering.id).await?;
    let usernames: HashMap<Uuid, String> =
        students.into_iter().map(|s| (s.id, s.username)).collect();
    let display_name = |usernames: &HashMap<Uuid, String>, id: Uuid| {
        usernames.get(&id).cloned().unwrap_or_else(|| id.to_string())
    };

    let report_session: HashMap<i32, i32> = reports.iter().map(|r| (r.id, r.session_id)).collect();
    let session_week: HashMap<i32, i32> = sessions.iter().map(|s| (s.id, s.week)).collect();

    let mut session_rows = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let present_count = participations
            .iter()
            .filter(|p| p.session_id == session.id && p.present)
            .count() as u64;
        let graded_count = grades
            .iter()
            .filter(|g| report_session.get(&g.lab_report_id) == Some(&session.id) && g.grade.is_some())
            .count() as u64;
        session_rows.push(SessionRow {
            week: session.week,
            name: session.name.clone(),
            date: session.date,
            present_count,
            graded_count,
        });
    }

    let participation_rows = participations
        .iter()
        .map(|p| ParticipationRow {
            week: session_week.get(&p.session_id).copied().unwrap_or_default(),
            student: display_name(&usernames, p.student_id),
            present: p.present,
        })
        .collect();

    let grade_rows = grades
        .iter()
        .map(|g| LabGradeRow {
            week: report_session
                .get(&g.lab_report_id)
                .and_then(|session_id| session_week.get(session_id))
                .copied()
                .unwrap_or_default(),
            student: display_name(&usernames, g.student_id),
            grade: g.grade,
        })
        .collect();

    let mut final_rows = Vec::new();
    if let Some(assignment) = final_assignment::Query::find_for(db, offering.id).await? {
        for (result, student) in final_assignment_result::Query::list_with_students(db, assignment.id).await? {
            let student = student
                .map(|s| s.username)
                .unwrap_or_else(|| result.student_id.to_string());
            final_rows.push(FinalResultRow {
                student,
                submitted: result.submitted,
                grade: result.grade,
            });
        }
    }

    Ok(OfferingExportData {
        course_semester_id: offering.id,
        course_code: course.code.clone(),
        course_title: course.title.clone(),
        year: offering.year,
        semester: offering.semester.to_value(),
        sessions: session_rows,
        participations: participation_rows,
        lab_grades: grade_rows,
        final_assignment: final_rows,
    })
}

fn offering_csv(data: &OfferingExportData) -> String {
    let mut out = String::from(UTF8_BOM);
    out.push_str("course_code,course_title,year,semester\n");
    out.push_str(&format!(
        "{},{},{},{}\n",
        escape_csv(&data.course_code),
        escape_csv(&data.course_title),
        data.year,
        data.semester,
    ));
    out.push('\n');
    out.push_str("sessions: week,name,date,present_count,graded_count\n");
    for row in &data.sessions {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            row.week,
            escape_csv(&row.name),
            row.date,
            row.present_count,
            row.graded_count,
        ));
    }
    out.push('\n');
    out.push_str("participations: week,student,present\n");
    for row in &data.participations {
        out.push_str(&format!("{},{},{}\n", row.week, escape_csv(&row.student), row.present));
    }
    out.push('\n');
    out.push_str("lab_grades: week,student,grade\n");
    for row in &data.lab_grades {
        out.push_str(&format!(
            "{},{},{}\n",
            row.week,
            escape_csv(&row.student),
            format_grade(row.grade),
        ));
    }
    out.push('\n');
    out.push_str("final_assignment: student,submitted,grade\n");
    for row in &data.final_assignment {
        out.push_str(&format!(
            "{},{},{}\n",
            escape_csv(&row.student),
            row.submitted,
            format_grade(row.grade),
        ));
    }
    out
}

#[cfg(feature = "xlsx")]
fn offering_workbook(data: &OfferingExportData) -> Option<Vec<u8>> {
    match build_offering_workbook(data) {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::warn!(error = &error as &dyn std::error::Error, "workbook rendering failed, falling back to csv");
            None
        }
    }
}

#[cfg(not(feature = "xlsx"))]
fn offering_workbook(_data: &OfferingExportData) -> Option<Vec<u8>> {
    None
}

#[cfg(feature = "xlsx")]
fn build_offering_workbook(data: &OfferingExportData) -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();

    let overview = workbook.add_worksheet();
    overview.set_name("offering")?;
    for (col, header) in ["course_code", "course_title", "year", "semester"].iter().enumerate() {
        overview.write_string(0, col as u16, *header)?;
    }
    overview.write_string(1, 0, &data.course_code)?;
    overview.write_string(1, 1, &data.course_title)?;
    overview.write_number(1, 2, f64::from(data.year))?;
    overview.write_string(1, 3, &data.semester)?;

    let sessions = workbook.add_worksheet();
    sessions.set_name("sessions")?;
    for (col, header) in ["week", "name", "date", "present_count", "graded_count"].iter().enumerate() {
        sessions.write_string(0, col as u16, *header)?;
    }
    for (index, row) in data.sessions.iter().enumerate() {
        let r = (index + 1) as u32;
        sessions.write_number(r, 0, f64::from(row.week))?;
        sessions.write_string(r, 1, &row.name)?;
        sessions.write_string(r, 2, row.date.to_string())?;
        sessions.write_number(r, 3, row.present_count as f64)?;
        sessions.write_number(r, 4, row.graded_count as f64)?;
    }

    let participations = workbook.add_worksheet();
    participations.set_name("participations")?;
    for (col, header) in ["week", "student", "present"].iter().enumerate() {
        participations.write_string(0, col as u16, *header)?;
    }
    for (index, row) in data.participations.iter().enumerate() {
        let r = (index + 1) as u32;
        participations.write_number(r, 0, f64::from(row.week))?;
        participations.write_string(r, 1, &row.student)?;
        participations.write_boolean(r, 2, row.present)?;
    }

    let grades = workbook.add_worksheet();
    grades.set_name("lab_grades")?;
    for (col, header) in ["week", "student", "grade"].iter().enumerate() {
        grades.write_string(0, col as u16, *header)?;
    }
    for (index, row) in data.lab_grades.iter().enumerate() {
        let r = (index + 1) as u32;
        grades.write_number(r, 0, f64::from(row.week))?;
        grades.write_string(r, 1, &row.student)?;
        match row.grade {
            Some(grade) => {
                grades.write_number(r, 2, f64::from(grade))?;
            }
            None => {
                grades.write_string(r, 2, "")?;
            }
        }
    }

    let finals = workbook.add_worksheet();
    finals.set_name("final_assignment")?;
    for (col, header) in ["student", "submitted", "grade"].iter().enumerate() {
        finals.write_string(0, col as u16, *header)?;
    }
    for (index, row) in data.final_assignment.iter().enumerate() {
        let r = (index + 1) as u32;
        finals.write_string(r, 0, &row.student)?;
        finals.write_boolean(r, 1, row.submitted)?;
        match row.grade {
            Some(grade) => {
                finals.write_number(r, 2, f64::from(grade))?;
            }
            None => {
                finals.write_string(r, 2, "")?;
            }
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::OfferingBreakdown;

    fn fixture_stats() -> DashboardStats {
        DashboardStats {
            active_courses: 2,
            unique_students: 3,
            upcoming_labs: 1,
            lab_grades_done: 4,
            lab_grades_null: 2,
            fa_submitted: 1,
            fa_graded: 1,
            fa_avg: Some(9.0),
            overdue_ungraded: 1,
            no_attendance_sessions: 2,
            per_course: vec![OfferingBreakdown {
                course_semester_id: 11,
                course_code: "CSX".to_owned(),
                course_title: "XLSX Course".to_owned(),
                year: 2025,
                semester: praxis_entity::course_semester::Semester::Winter,
                students: 3,
                upcoming_sessions: 1,
                lab_done: 4,
                lab_null: 2,
                fa_submitted: 1,
                fa_graded: 1,
            }],
            attendance_trend: [0, 1, 2, 3],
        }
    }

    #[test]
    fn dashboard_csv_layout() {
        let export = render_dashboard_export(&fixture_stats(), 7, Some(11), ExportFormat::Csv);
        let body = String::from_utf8(export.bytes).unwrap();

        assert!(body.starts_with(UTF8_BOM));
        assert!(body.contains("key,value\n"));
        assert!(body.contains("active_courses,2\n"));
        assert!(body.contains("fa_avg,9.00\n"));
        assert!(body.contains("course_code,course_title,year,students,upcoming_sessions,lab_done,lab_null,fa_sub,fa_grd\n"));
        assert!(body.contains("CSX,XLSX Course,2025,3,1,4,2,1,1\n"));
        assert_eq!(export.filename, "dashboard_stats_d7_c11.csv");
        assert_eq!(export.content_type, CSV_CONTENT_TYPE);
    }

    #[test]
    fn missing_average_renders_empty() {
        let mut stats = fixture_stats();
        stats.fa_avg = None;
        let export = render_dashboard_export(&stats, 7, None, ExportFormat::Csv);
        let body = String::from_utf8(export.bytes).unwrap();
        assert!(body.contains("fa_avg,\n"));
        assert_eq!(export.filename, "dashboard_stats_d7_call.csv");
    }

    #[test]
    fn titles_with_commas_are_quoted() {
        let mut stats = fixture_stats();
        stats.per_course[0].course_title = "Data, Structures".to_owned();
        let export = render_dashboard_export(&stats, 14, None, ExportFormat::Csv);
        let body = String::from_utf8(export.bytes).unwrap();
        assert!(body.contains("CSX,\"Data, Structures\",2025"));
    }

    #[test]
    fn fallback_to_csv_when_workbook_unavailable() {
        let export = assemble(
            "dashboard_stats_d7_call".to_owned(),
            ExportFormat::Xlsx,
            None,
            dashboard_csv(&fixture_stats()),
        );
        assert_eq!(export.content_type, CSV_CONTENT_TYPE);
        assert_eq!(export.filename, "dashboard_stats_d7_call.csv");
        assert!(String::from_utf8(export.bytes).unwrap().contains("active_courses,2"));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn workbook_export_is_a_real_spreadsheet() {
        let export = render_dashboard_export(&fixture_stats(), 7, None, ExportFormat::Xlsx);
        assert_eq!(export.content_type, XLSX_CONTENT_TYPE);
        assert_eq!(export.filename, "dashboard_stats_d7_call.xlsx");
        // xlsx payloads are zip archives.
        assert!(export.bytes.len() > 100);
        assert_eq!(&export.bytes[..2], b"PK");
    }

    #[test]
    fn format_parse_is_lenient() {
        assert_eq!(ExportFormat::parse(Some("xlsx")), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::parse(Some("csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(Some("pdf")), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse(None), ExportFormat::Csv);
    }

    fn fixture_offering() -> OfferingExportData {
        OfferingExportData {
            course_semester_id: 42,
            course_code: "CS200".to_owned(),
            course_title: "Data".to_owned(),
            year: 2025,
            semester: "WINTER".to_owned(),
            sessions: vec![SessionRow {
                week: 1,
                name: "L1".to_owned(),
                date: NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
                present_count: 1,
                graded_count: 1,
            }],
            participations: vec![
                ParticipationRow {
                    week: 1,
                    student: "s1".to_owned(),
                    present: true,
                },
                ParticipationRow {
                    week: 1,
                    student: "s2".to_owned(),
                    present: false,
                },
            ],
            lab_grades: vec![LabGradeRow {
                week: 1,
                student: "s1".to_owned(),
                grade: Some(8),
            }],
            final_assignment: vec![
                FinalResultRow {
                    student: "s1".to_owned(),
                    submitted: true,
                    grade: Some(9),
                },
                FinalResultRow {
                    student: "s2".to_owned(),
                    submitted: false,
                    grade: None,
                },
            ],
        }
    }

    #[test]
    fn offering_csv_sections_in_order() {
        let export = render_offering_export(&fixture_offering(), ExportFormat::Csv);
        let body = String::from_utf8(export.bytes).unwrap();

        assert!(body.contains("course_code,course_title,year,semester\n"));
        assert!(body.contains("CS200,Data,2025,WINTER\n"));
        let sessions = body.find("sessions: week,name,date,present_count,graded_count").unwrap();
        let participations = body.find("participations: week,student,present").unwrap();
        let grades = body.find("lab_grades: week,student,grade").unwrap();
        let finals = body.find("final_assignment: student,submitted,grade").unwrap();
        assert!(sessions < participations && participations < grades && grades < finals);
        assert!(body.contains("1,L1,2025-01-07,1,1\n"));
        assert!(body.contains("1,s1,true\n"));
        assert!(body.contains("s2,false,\n"));
        assert_eq!(export.filename, "course_semester_42.csv");
    }
}
