// core/src/print.rs
// Printable sheets: a standalone RTL HTML document handed to the browser's print dialog.
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::descriptor::{fmt_num, TestRow};
use crate::sheet::Sheet;
use crate::team_record::{Capacity, TeamEntry};

#[derive(Debug, Clone)]
pub struct PrintHeader {
    pub federation: String,
    pub club_name: String,
    pub date: NaiveDate,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn column_title(column: &str) -> &str {
    match column {
        "attempt_1" => "المحاولة 1",
        "attempt_2" => "المحاولة 2",
        "attempt_3" => "المحاولة 3",
        "round_1" => "الجولة 1",
        "round_2" => "الجولة 2",
        "round_3" => "الجولة 3",
        "round_4" => "الجولة 4",
        "round_5" => "الجولة 5",
        "round_6" => "الجولة 6",
        "time_s" => "الزمن المحقق (ثا)",
        "wrong" => "المحاولات الخاطئة",
        "interval_s" => "المدة (ثا)",
        "result" => "النتيجة",
        "weight_kg" => "الوزن (كغ)",
        "height_cm" => "الطول (سم)",
        "fat_pct" => "نسبة الدهون %",
        "best" => "أفضل نتيجة",
        "final_score" => "النتيجة النهائية",
        "mean" => "المتوسط",
        "percentage" => "النسبة",
        "index" => "المؤشر",
        "rating" => "التقييم",
        "fat_kg" => "وزن الدهون (كغ)",
        "lean_kg" => "الكتلة العضلية (كغ)",
        "standard" => "المعيار",
        other => other,
    }
}

fn open_document(out: &mut String, title: &str, header: &PrintHeader) {
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"ar\" dir=\"rtl\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\
         body{{font-family:Arial,sans-serif;margin:24px}}\
         table{{border-collapse:collapse;width:100%}}\
         th,td{{border:1px solid #333;padding:4px 6px;text-align:center}}\
         th{{background:#eee}}\
         </style>\n</head>\n<body>\n\
         <header>\n<h2>{fed}</h2>\n<h3>{title}</h3>\n\
         <p>النادي: {club} &nbsp;|&nbsp; التاريخ: {date}</p>\n</header>\n",
        title = escape_html(title),
        fed = escape_html(&header.federation),
        club = escape_html(&header.club_name),
        date = header.date.format("%d/%m/%Y"),
    );
}

fn close_document(out: &mut String) {
    out.push_str("</body>\n</html>\n");
}

fn push_row(out: &mut String, tag: &str, cells: &[String]) {
    out.push_str("<tr>");
    for c in cells {
        let _ = write!(out, "<{tag}>{}</{tag}>", escape_html(c));
    }
    out.push_str("</tr>\n");
}

/// One table row per athlete: name, category, age, raw fields, derived columns, notes.
pub fn render_test_sheet(sheet: &Sheet<TestRow>, header: &PrintHeader) -> String {
    let mut out = String::new();
    let d = sheet.kind().descriptor();
    open_document(&mut out, d.title_ar, header);

    let columns: Vec<&str> = d.raw_fields.iter().chain(d.derived_columns.iter()).copied().collect();
    out.push_str("<table>\n<thead>\n");
    let mut titles = vec!["#".to_string(), "الاسم واللقب".to_string(), "الفئة".to_string(), "السن".to_string()];
    titles.extend(columns.iter().map(|c| column_title(c).to_string()));
    titles.push("ملاحظات".to_string());
    push_row(&mut out, "th", &titles);
    out.push_str("</thead>\n<tbody>\n");

    for row in sheet.rows() {
        let age = if row.athlete.age > 0 { row.athlete.age.to_string() } else { String::new() };
        let mut cells = vec![row.id.clone(), row.athlete.name.clone(), row.athlete.category.clone(), age];
        cells.extend(columns.iter().map(|c| row.cell(c)));
        cells.push(row.notes.clone());
        push_row(&mut out, "td", &cells);
    }
    out.push_str("</tbody>\n</table>\n");
    close_document(&mut out);
    out
}

/// Team record: per-capacity grades, overall grade and standard.
pub fn render_team_record(sheet: &Sheet<TeamEntry>, header: &PrintHeader) -> String {
    let mut out = String::new();
    open_document(&mut out, "السجل الجماعي للقدرات البدنية", header);
    out.push_str("<table>\n<thead>\n");
    let mut titles = vec!["#".to_string(), "الاسم واللقب".to_string(), "الفئة".to_string()];
    titles.extend(Capacity::ALL.iter().map(|c| c.label_ar().to_string()));
    titles.extend(["المجموع", "الدرجة", "المستوى"].iter().map(|s| s.to_string()));
    push_row(&mut out, "th", &titles);
    out.push_str("</thead>\n<tbody>\n");

    for e in sheet.rows() {
        let mut cells = vec![e.id.clone(), e.name.clone(), e.category.clone()];
        cells.extend(Capacity::ALL.iter().map(|c| fmt_num(e.grade(*c))));
        cells.push(fmt_num(e.total));
        cells.push(fmt_num(e.overall));
        cells.push(e.standard.map(|r| r.label_ar().to_string()).unwrap_or_default());
        push_row(&mut out, "td", &cells);
    }
    out.push_str("</tbody>\n</table>\n");
    close_document(&mut out);
    out
}
