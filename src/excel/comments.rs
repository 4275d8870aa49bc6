//! Cell comment reader
//!
//! calamine exposes cell values and merged regions but not notes, so comments
//! are read straight from the OOXML package: `xl/workbook.xml` maps the sheet
//! name to a relationship id, the workbook relationships map that id to the
//! worksheet part, and the worksheet relationships point at its comments part.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use regex::Regex;
use zip::ZipArchive;

use crate::error::{OnboardError, OnboardResult};

const COMMENTS_REL_SUFFIX: &str = "/comments";

/// Comments of one worksheet keyed by zero-based `(row, col)`.
pub type SheetComments = HashMap<(u32, u32), String>;

/// Reads every cell comment on `sheet_name`. A sheet without comments yields an empty map.
pub fn read_sheet_comments(bytes: &[u8], sheet_name: &str) -> OnboardResult<SheetComments> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| OnboardError::Extraction(format!("Workbook is not a valid xlsx package: {}", e)))?;

    let Some(workbook_xml) = read_part(&mut archive, "xl/workbook.xml")? else {
        return Err(OnboardError::Extraction(
            "Workbook package has no xl/workbook.xml".to_string(),
        ));
    };
    let Some(rel_id) = sheet_relationship_id(&workbook_xml, sheet_name)? else {
        return Ok(SheetComments::new());
    };

    let workbook_rels = match read_part(&mut archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships(&xml)?,
        None => return Ok(SheetComments::new()),
    };
    let Some(sheet_rel) = workbook_rels.iter().find(|r| r.id == rel_id) else {
        return Ok(SheetComments::new());
    };
    let sheet_part = resolve_target("xl/workbook.xml", &sheet_rel.target);

    let sheet_rels = match read_part(&mut archive, &rels_for_part(&sheet_part))? {
        Some(xml) => parse_relationships(&xml)?,
        None => return Ok(SheetComments::new()),
    };

    let mut comments = SheetComments::new();
    for rel in sheet_rels
        .iter()
        .filter(|r| r.kind.ends_with(COMMENTS_REL_SUFFIX))
    {
        let part = resolve_target(&sheet_part, &rel.target);
        if let Some(xml) = read_part(&mut archive, &part)? {
            comments.extend(parse_comments(&xml)?);
        }
    }
    Ok(comments)
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> OnboardResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(OnboardError::Extraction(format!(
                "Cannot read {} from workbook: {}",
                name, e
            )))
        }
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
}

fn xml_error(e: impl std::fmt::Display) -> OnboardError {
    OnboardError::Extraction(format!("Malformed workbook XML: {}", e))
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Finds the `r:id` of the `<sheet>` whose name matches.
fn sheet_relationship_id(workbook_xml: &str, sheet_name: &str) -> OnboardResult<Option<String>> {
    let mut reader = XmlReader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) | Event::Empty(ref e) if local_name(e.name().as_ref()) == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(xml_error)?;
                    let key = attr.key.as_ref();
                    let value = attr.unescape_value().map_err(xml_error)?.into_owned();
                    if key == b"name" {
                        name = Some(value);
                    } else if key != b"sheetId" && local_name(key) == b"id" {
                        rel_id = Some(value);
                    }
                }
                if name.as_deref() == Some(sheet_name) {
                    return Ok(rel_id);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn parse_relationships(xml: &str) -> OnboardResult<Vec<Relationship>> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = None;
                let mut kind = String::new();
                let mut target = String::new();
                for attr in e.attributes() {
                    let attr = attr.map_err(xml_error)?;
                    let value = attr.unescape_value().map_err(xml_error)?.into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Type" => kind = value,
                        b"Target" => target = value,
                        _ => {}
                    }
                }
                if let Some(id) = id {
                    rels.push(Relationship { id, kind, target });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

/// Extracts `ref -> text` from a comments part, joining all `<t>` runs.
fn parse_comments(xml: &str) -> OnboardResult<SheetComments> {
    let mut reader = XmlReader::from_str(xml);
    let mut comments = SheetComments::new();
    let mut current: Option<((u32, u32), String)> = None;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"comment" => {
                    let mut cell = None;
                    for attr in e.attributes() {
                        let attr = attr.map_err(xml_error)?;
                        if attr.key.as_ref() == b"ref" {
                            let value = attr.unescape_value().map_err(xml_error)?;
                            cell = parse_cell_ref(&value);
                        }
                    }
                    current = cell.map(|c| (c, String::new()));
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"comment" => {
                    if let Some((cell, text)) = current.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            comments.insert(cell, text.to_string());
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(comments)
}

/// Parses an A1 reference into zero-based `(row, col)`.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$").ok())
        .as_ref()?;
    let caps = re.captures(reference.trim())?;
    let col = caps[1]
        .to_ascii_uppercase()
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));
    let row: u32 = caps[2].parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

fn rels_for_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{dir}/_rels/{file_name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{base_dir}/{target}"))
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B12"), Some((11, 1)));
        assert_eq!(parse_cell_ref("$AA$3"), Some((2, 26)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("12"), None);
    }

    #[test]
    fn test_parse_cell_ref_is_stable_across_calls() {
        for row in 1..=200u32 {
            assert_eq!(parse_cell_ref(&format!("c{}", row)), Some((row - 1, 2)));
        }
        assert_eq!(parse_cell_ref(" $B$2 "), Some((1, 1)));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet2.xml"),
            "xl/worksheets/sheet2.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets/sheet2.xml", "../comments1.xml"),
            "xl/comments1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
    }

    #[test]
    fn test_rels_for_part() {
        assert_eq!(
            rels_for_part("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_sheet_relationship_id() {
        let xml = r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="unit group" sheetId="1" r:id="rId1"/>
    <sheet name="unit" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;
        assert_eq!(sheet_relationship_id(xml, "unit").unwrap(), Some("rId2".to_string()));
        assert_eq!(sheet_relationship_id(xml, "missing").unwrap(), None);
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/vmlDrawing" Target="../drawings/vmlDrawing1.vml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../comments1.xml"/>
</Relationships>"#;
        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert!(rels[1].kind.ends_with(COMMENTS_REL_SUFFIX));
        assert_eq!(rels[1].target, "../comments1.xml");
    }

    #[test]
    fn test_parse_comments_joins_runs() {
        let xml = r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <authors><author>ops</author></authors>
  <commentList>
    <comment ref="B2" authorId="0"><text><r><t xml:space="preserve">Use SI </t></r><r><t>units</t></r></text></comment>
    <comment ref="A1" authorId="0"><text><t>Header &amp; key</t></text></comment>
    <comment ref="C3" authorId="0"><text><t>   </t></text></comment>
  </commentList>
</comments>"#;
        let comments = parse_comments(xml).unwrap();
        assert_eq!(comments.get(&(1, 1)).map(String::as_str), Some("Use SI units"));
        assert_eq!(comments.get(&(0, 0)).map(String::as_str), Some("Header & key"));
        assert!(!comments.contains_key(&(2, 2)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = read_sheet_comments(b"plain text", "unit").unwrap_err();
        assert!(matches!(err, OnboardError::Extraction(_)));
    }
}
