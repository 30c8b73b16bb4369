//! Report writers: plain CSV sheets and serde-serializable JSON reports.

use std::io::Write;

use serde::Serialize;

use crate::constants::{FIELD_DELIMITER, LINE_BREAK, QUOTE};
use crate::ingest::{Act, Dataset, Diagnostic, ElementId, GameItem};
use crate::text::Str;
use crate::{Error, Result};

const PAIR_SEPARATOR: &[u8] = b" x ";

/// Header row of mechanic names behind an empty corner cell, then one row of
/// counts per mechanic.
pub fn write_matrix_csv<W: Write>(mut writer: W, dataset: &Dataset<'_>) -> Result<()> {
    let names = dataset.catalog().names();
    let mut buf = itoa::Buffer::new();

    for name in names {
        writer.write_all(b",")?;
        write_cell(&mut writer, &[name.as_bytes()])?;
    }
    writer.write_all(b"\n")?;

    for (name, row) in names.iter().zip(dataset.matrix().rows()) {
        write_cell(&mut writer, &[name.as_bytes()])?;
        for &count in row {
            writer.write_all(b",")?;
            writer.write_all(buf.format(count).as_bytes())?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// One `<a> x <b>,<count>` row per unordered pair.
pub fn write_pair_counts<W: Write>(mut writer: W, dataset: &Dataset<'_>) -> Result<()> {
    let names = dataset.catalog().names();
    let mut buf = itoa::Buffer::new();
    for (i, j, count) in dataset.matrix().pairs() {
        write_pair_label(&mut writer, names[i], names[j])?;
        writer.write_all(b",")?;
        writer.write_all(buf.format(count).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// For every ordered pair of distinct mechanics, the label row carries the
/// first matching item and each further item gets its own row below it.
pub fn write_pair_items<W: Write>(mut writer: W, dataset: &Dataset<'_>) -> Result<()> {
    let names = dataset.catalog().names();
    for i in 0..names.len() {
        for j in (0..names.len()).filter(|&j| j != i) {
            write_pair_label(&mut writer, names[i], names[j])?;
            let mut listed = false;
            for (_, item) in dataset.items_with(i, j) {
                writer.write_all(b",")?;
                write_cell(&mut writer, &[item.name.as_bytes()])?;
                writer.write_all(b"\n")?;
                listed = true;
            }
            if !listed {
                writer.write_all(b"\n")?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// `name,id,fate,image` rows for a detail listing.
pub fn write_items_csv<W: Write>(mut writer: W, items: &[ItemReport<'_>]) -> Result<()> {
    for item in items {
        let fate = item.fate.map(|fate| fate.as_bytes()).unwrap_or_default();
        let image = item.image.as_deref().map(str::as_bytes).unwrap_or_default();
        let cells = [item.name.as_bytes(), item.id.as_bytes(), fate, image];
        for (n, cell) in cells.into_iter().enumerate() {
            if n > 0 {
                writer.write_all(b",")?;
            }
            write_cell(&mut writer, &[cell])?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// The whole `<a> x <b>` label is one cell.
fn write_pair_label<W: Write>(writer: &mut W, a: Str<'_>, b: Str<'_>) -> Result<()> {
    write_cell(writer, &[a.as_bytes(), PAIR_SEPARATOR, b.as_bytes()])
}

/// Writes `parts` back to back as a single CSV cell. The cell is wrapped in
/// quotes, with inner quotes doubled, when it holds a delimiter, a quote or a
/// line break.
fn write_cell<W: Write>(writer: &mut W, parts: &[&[u8]]) -> Result<()> {
    let needs_quotes = parts.iter().any(|part| {
        memchr::memchr3(FIELD_DELIMITER, QUOTE, LINE_BREAK, part).is_some()
            || memchr::memchr(b'\r', part).is_some()
    });
    if !needs_quotes {
        for part in parts {
            writer.write_all(part)?;
        }
        return Ok(());
    }

    writer.write_all(&[QUOTE])?;
    for part in parts {
        let mut start = 0;
        for quote in memchr::memchr_iter(QUOTE, part) {
            writer.write_all(&part[start..=quote])?;
            writer.write_all(&[QUOTE])?;
            start = quote + 1;
        }
        writer.write_all(&part[start..])?;
    }
    writer.write_all(&[QUOTE])?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|err| Error::io(format!("failed to write report: {err}")))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MatrixReport<'d> {
    pub mechanics: &'d [Str<'d>],
    pub counts: Vec<&'d [u32]>,
    pub elements: usize,
    pub unresolved: usize,
    pub diagnostics: &'d [Diagnostic],
}

impl<'d> MatrixReport<'d> {
    pub fn new(dataset: &'d Dataset<'_>) -> Self {
        Self {
            mechanics: dataset.catalog().names(),
            counts: dataset.matrix().rows().collect(),
            elements: dataset.elements().len(),
            unresolved: dataset.matrix().unresolved(),
            diagnostics: dataset.diagnostics(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport<'d> {
    pub element: ElementId,
    pub name: Str<'d>,
    pub id: Str<'d>,
    pub note: Str<'d>,
    pub fate: Option<Str<'d>>,
    pub act: Option<Act>,
    pub mechanics: &'d [Str<'d>],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl<'d> ItemReport<'d> {
    pub fn new(dataset: &'d Dataset<'_>, element: ElementId, item: &'d GameItem<'_>) -> Self {
        let fate = dataset.parent_fate(item);
        Self {
            element,
            name: item.name,
            id: item.id,
            note: item.note,
            fate: fate.map(|fate| fate.name),
            act: fate.map(|fate| fate.act),
            mechanics: &item.mechanics,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct PairReport<'d> {
    pub a: Str<'d>,
    pub b: Str<'d>,
    pub count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemReport<'d>>,
}

impl<'d> PairReport<'d> {
    /// Count only, no item listing.
    pub fn count(dataset: &'d Dataset<'_>, i: usize, j: usize) -> Option<Self> {
        let catalog = dataset.catalog();
        Some(Self {
            a: catalog.name(i)?,
            b: catalog.name(j)?,
            count: dataset.matrix().get(i, j)?,
            items: Vec::new(),
        })
    }

    pub fn with_items(dataset: &'d Dataset<'_>, i: usize, j: usize) -> Option<Self> {
        let mut report = Self::count(dataset, i, j)?;
        report.items = dataset
            .items_with(i, j)
            .map(|(id, item)| ItemReport::new(dataset, id, item))
            .collect();
        Some(report)
    }

    /// Every unordered pair, counts only.
    pub fn all_counts(dataset: &'d Dataset<'_>) -> Vec<Self> {
        dataset
            .matrix()
            .pairs()
            .filter_map(|(i, j, _)| Self::count(dataset, i, j))
            .collect()
    }

    /// Every ordered pair of distinct mechanics, with items.
    pub fn all_items(dataset: &'d Dataset<'_>) -> Vec<Self> {
        let size = dataset.catalog().len();
        (0..size)
            .flat_map(|i| (0..size).filter(move |&j| j != i).map(move |j| (i, j)))
            .filter_map(|(i, j)| Self::with_items(dataset, i, j))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arena, LoadOptions};

    const MECHANICS: &str = "Name\nCombat\nTrade\n";
    const MANIFEST: &str = "Fate1,A,,,\nFate1,Item1,Combat,ID1,NoteA\n,,Trade,,\nFate1,Item2,Trade,ID2,\n";

    fn render(write: impl Fn(&mut Vec<u8>, &Dataset<'_>) -> Result<()>) -> String {
        let mut arena = Arena::with_capacity(1 << 20);
        let dataset = Dataset::load(
            MANIFEST.as_bytes(),
            MECHANICS.as_bytes(),
            &mut arena,
            &LoadOptions::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        write(&mut out, &dataset).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest::rstest]
    fn test_matrix_csv() {
        let csv = render(|out, dataset| write_matrix_csv(out, dataset));
        assert_eq!(csv, ",Combat,Trade\nCombat,1,1\nTrade,1,2\n");
    }

    #[rstest::rstest]
    fn test_pair_counts() {
        let csv = render(|out, dataset| write_pair_counts(out, dataset));
        assert_eq!(csv, "Combat x Trade,1\n");
    }

    #[rstest::rstest]
    fn test_pair_items() {
        let csv = render(|out, dataset| write_pair_items(out, dataset));
        assert_eq!(csv, "Combat x Trade,Item1\nTrade x Combat,Item1\n");
    }

    #[rstest::rstest]
    fn test_pair_items_continuation_rows() {
        let mut arena = Arena::with_capacity(1 << 20);
        let dataset = Dataset::load(
            b"F,A\nF,I1,Combat\n,,Trade\nF,I2,Trade\n,,Combat\n",
            b"Name\nCombat\nTrade\nBuild\n",
            &mut arena,
            &LoadOptions::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        write_pair_items(&mut out, &dataset).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                "Combat x Trade,I1",
                ",I2",
                "Combat x Build",
                "Trade x Combat,I1",
                ",I2",
                "Trade x Build",
                "Build x Combat",
                "Build x Trade",
            ]
        );
    }

    #[rstest::rstest]
    fn test_matrix_report_json() {
        let json = render(|out, dataset| write_json(out, &MatrixReport::new(dataset)));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mechanics"], serde_json::json!(["Combat", "Trade"]));
        assert_eq!(value["counts"], serde_json::json!([[1, 1], [1, 2]]));
        assert_eq!(value["elements"], 3);
        assert_eq!(value["unresolved"], 0);
    }

    #[rstest::rstest]
    fn test_pair_report_json() {
        let json = render(|out, dataset| {
            let report = PairReport::with_items(dataset, 0, 1).unwrap();
            write_json(out, &report)
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["a"], "Combat");
        assert_eq!(value["count"], 1);
        let item = &value["items"][0];
        assert_eq!(item["name"], "Item1");
        assert_eq!(item["id"], "ID1");
        assert_eq!(item["fate"], "Fate1");
        assert_eq!(item["act"], "A");
        assert_eq!(item["mechanics"], serde_json::json!(["Combat", "Trade"]));
        assert!(item.get("image").is_none());
    }

    #[rstest::rstest]
    fn test_item_rows_csv() {
        let csv = render(|out, dataset| {
            let items: Vec<ItemReport<'_>> = dataset
                .items()
                .map(|(id, item)| ItemReport::new(dataset, id, item))
                .enumerate()
                .map(|(n, report)| if n == 0 { report.with_image("img/ID1.png") } else { report })
                .collect();
            write_items_csv(out, &items)
        });
        assert_eq!(csv, "Item1,ID1,Fate1,img/ID1.png\nItem2,ID2,Fate1,\n");
    }

    fn render_with(
        mechanics: &str,
        write: impl Fn(&mut Vec<u8>, &Dataset<'_>) -> Result<()>,
    ) -> String {
        let mut arena = Arena::with_capacity(1 << 20);
        let dataset = Dataset::load(
            b"F,A\nF,\"Item, One\",Trade,ID1\n,,\"Build, Deploy\"\n",
            mechanics.as_bytes(),
            &mut arena,
            &LoadOptions::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        write(&mut out, &dataset).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest::rstest]
    fn test_names_with_delimiters_are_quoted() {
        let mechanics = "Name\n\"Build, Deploy\"\nTrade\n";

        let counts = render_with(mechanics, |out, dataset| write_pair_counts(out, dataset));
        assert_eq!(counts, "\"\"\"Build, Deploy\"\" x Trade\",1\n");

        let matrix = render_with(mechanics, |out, dataset| write_matrix_csv(out, dataset));
        assert_eq!(
            matrix.lines().next(),
            Some(",\"\"\"Build, Deploy\"\"\",Trade")
        );

        let items = render_with(mechanics, |out, dataset| write_pair_items(out, dataset));
        assert_eq!(
            items.lines().next(),
            Some("\"\"\"Build, Deploy\"\" x Trade\",\"\"\"Item, One\"\"\"")
        );
    }

    #[rstest::rstest]
    #[case("plain", "plain")]
    #[case("a,b", "\"a,b\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case("two\nlines", "\"two\nlines\"")]
    #[case("cr\r", "\"cr\r\"")]
    #[case("", "")]
    fn test_write_cell(#[case] cell: &str, #[case] expected: &str) {
        let mut out = Vec::new();
        write_cell(&mut out, &[cell.as_bytes()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[rstest::rstest]
    fn test_item_rows_csv_quotes_cells() {
        let mut arena = Arena::with_capacity(1 << 20);
        let dataset = Dataset::load(
            b"F,A\nF,\"Item, One\",Trade,ID1\n",
            b"Name\nTrade\n",
            &mut arena,
            &LoadOptions::default(),
        )
        .unwrap();
        let items: Vec<ItemReport<'_>> = dataset
            .items()
            .map(|(id, item)| ItemReport::new(&dataset, id, item).with_image("img/a,b.png"))
            .collect();
        let mut out = Vec::new();
        write_items_csv(&mut out, &items).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"\"\"Item, One\"\"\",ID1,F,\"img/a,b.png\"\n"
        );
    }

    #[rstest::rstest]
    fn test_all_pair_reports() {
        let mut arena = Arena::with_capacity(1 << 20);
        let dataset = Dataset::load(
            MANIFEST.as_bytes(),
            MECHANICS.as_bytes(),
            &mut arena,
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(PairReport::all_counts(&dataset).len(), 1);
        let all = PairReport::all_items(&dataset);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].a, "Trade");
        assert_eq!(all[1].items.len(), 1);
    }
}
