//! Patch-based serialization of a mutated structural model back into
//! `word/document.xml`.
//!
//! The writer re-parses the original part as a baseline, diffs the mutated
//! model against it, and then streams the original events through verbatim
//! except where a managed property actually changed. Untouched content is
//! emitted byte for byte, so saving an unmodified document reproduces the
//! original part exactly and a second save after a repair is stable.
//!
//! Managed properties are the ones repairs mutate: paragraph alignment,
//! spacing and indentation, run fonts, and section page margins. Injected
//! elements are slotted by the schema child order of their parent, so a
//! synthesized `w:spacing` lands before an existing `w:jc`.

use std::collections::HashMap;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::Result;
use crate::model::{
    Alignment, Indent, LineSpacingRule, Margins, RunFont, Spacing, StructuralDocument,
};

use super::reader::parse_document;
use super::styles::StyleSheet;
use super::xml::{
    cm_to_twips, jc_from_alignment, multiple_to_line_units, pt_to_half_points, pt_to_twips,
};

/// Serialize the model back into the original `word/document.xml` bytes.
pub(crate) fn write_document_xml(
    original: &[u8],
    doc: &StructuralDocument,
    sheet: &StyleSheet,
) -> Result<Vec<u8>> {
    let baseline = parse_document(original, sheet)?;
    let plan = PatchPlan::build(doc, &baseline.paragraphs, &baseline.sections);
    if plan.is_empty() {
        return Ok(original.to_vec());
    }

    let mut reader = Reader::from_reader(original);
    let mut writer = Writer::new(Vec::new());
    let mut state = PatchWriter::new(&plan);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => state.on_start(e, &mut reader, &mut writer)?,
            Event::Empty(e) => state.on_empty(e, &mut writer)?,
            Event::End(e) => state.on_end(e, &mut writer)?,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }
    Ok(writer.into_inner())
}

/// Changes for one paragraph.
#[derive(Debug, Default)]
struct ParaPatch {
    alignment: Option<Alignment>,
    spacing: Option<Spacing>,
    indent: Option<Indent>,
    runs: HashMap<usize, RunFont>,
}

impl ParaPatch {
    fn has_ppr_changes(&self) -> bool {
        self.alignment.is_some() || self.spacing.is_some() || self.indent.is_some()
    }

    fn is_empty(&self) -> bool {
        !self.has_ppr_changes() && self.runs.is_empty()
    }
}

/// Everything that differs between the model and the baseline, keyed by
/// body-level paragraph and section index.
#[derive(Debug, Default)]
struct PatchPlan {
    paragraphs: HashMap<usize, ParaPatch>,
    sections: HashMap<usize, Margins>,
}

impl PatchPlan {
    fn build(
        doc: &StructuralDocument,
        base_paragraphs: &[crate::model::Paragraph],
        base_sections: &[crate::model::Section],
    ) -> Self {
        let mut plan = PatchPlan::default();
        for (i, model) in doc.paragraphs.iter().enumerate() {
            let Some(base) = base_paragraphs.get(i) else { break };
            let mut patch = ParaPatch::default();
            if model.alignment != base.alignment {
                patch.alignment = Some(model.alignment);
            }
            if model.spacing != base.spacing {
                patch.spacing = Some(model.spacing);
            }
            if model.indent != base.indent {
                patch.indent = Some(model.indent);
            }
            for (j, run) in model.runs.iter().enumerate() {
                if let Some(base_run) = base.runs.get(j) {
                    if run.font != base_run.font {
                        patch.runs.insert(j, run.font.clone());
                    }
                }
            }
            if !patch.is_empty() {
                plan.paragraphs.insert(i, patch);
            }
        }
        for (i, model) in doc.sections.iter().enumerate() {
            if let Some(base) = base_sections.get(i) {
                if model.margins != base.margins {
                    plan.sections.insert(i, model.margins);
                }
            }
        }
        plan
    }

    fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.sections.is_empty()
    }
}

#[derive(Debug)]
struct ParaWrite<'p> {
    patch: Option<&'p ParaPatch>,
    run_idx: usize,
    hyperlink_depth: usize,
    nested: usize,
    depth: usize,
    pending_ppr: bool,
    pending_rpr: Option<RunFont>,
}

/// Streaming pass that mirrors the reader's body-level counting rules.
struct PatchWriter<'p> {
    plan: &'p PatchPlan,
    tbl_depth: usize,
    txbx_depth: usize,
    para_idx: usize,
    sect_idx: usize,
    para: Option<ParaWrite<'p>>,
}

type Out = Writer<Vec<u8>>;

impl<'p> PatchWriter<'p> {
    fn new(plan: &'p PatchPlan) -> Self {
        Self {
            plan,
            tbl_depth: 0,
            txbx_depth: 0,
            para_idx: 0,
            sect_idx: 0,
            para: None,
        }
    }

    fn skipping(&self) -> bool {
        self.tbl_depth > 0 || self.txbx_depth > 0
    }

    fn on_start(
        &mut self,
        e: BytesStart<'_>,
        reader: &mut Reader<&[u8]>,
        w: &mut Out,
    ) -> Result<()> {
        let name = e.name().as_ref().to_vec();
        let name = name.as_slice();

        match name {
            b"w:tbl" => {
                self.tbl_depth += 1;
                w.write_event(Event::Start(e))?;
                return Ok(());
            }
            b"w:txbxContent" => {
                self.txbx_depth += 1;
                w.write_event(Event::Start(e))?;
                return Ok(());
            }
            _ => {}
        }
        if self.skipping() {
            w.write_event(Event::Start(e))?;
            return Ok(());
        }

        // a patched run resolves its properties at the first structural
        // event after the run start
        if let Some(p) = self.para.as_mut() {
            if let Some(font) = p.pending_rpr.take() {
                if name == b"w:rPr" {
                    let inner = capture_subtree(reader, b"w:rPr")?;
                    let children = patch_rpr_children(group_children(inner), &font);
                    w.write_event(Event::Start(e))?;
                    emit_children(w, children)?;
                    w.write_event(Event::End(BytesEnd::new("w:rPr")))?;
                    return Ok(());
                }
                emit_events(w, synth_rpr_events(&font))?;
            }
        }

        let direct = self
            .para
            .as_ref()
            .map(|p| p.nested == 0 && p.depth == 0)
            .unwrap_or(false);
        if direct && name != b"w:pPr" {
            self.flush_pending_ppr(w)?;
        }

        match name {
            b"w:p" => {
                match self.para.as_mut() {
                    Some(p) => {
                        p.nested += 1;
                        p.depth += 1;
                    }
                    None => {
                        let patch = self.plan.paragraphs.get(&self.para_idx);
                        self.para_idx += 1;
                        self.para = Some(ParaWrite {
                            patch,
                            run_idx: 0,
                            hyperlink_depth: 0,
                            nested: 0,
                            depth: 0,
                            pending_ppr: patch.map(ParaPatch::has_ppr_changes).unwrap_or(false),
                            pending_rpr: None,
                        });
                    }
                }
                w.write_event(Event::Start(e))?;
            }
            b"w:pPr" if direct && self.para.as_ref().map(|p| p.pending_ppr).unwrap_or(false) => {
                let patch = self.para.as_ref().and_then(|p| p.patch);
                if let Some(p) = self.para.as_mut() {
                    p.pending_ppr = false;
                }
                let inner = capture_subtree(reader, b"w:pPr")?;
                let mut children = group_children(inner);
                if let Some(patch) = patch {
                    children = self.patch_ppr_children(children, patch);
                }
                w.write_event(Event::Start(e))?;
                emit_children(w, children)?;
                w.write_event(Event::End(BytesEnd::new("w:pPr")))?;
            }
            b"w:r" => {
                if let Some(p) = self.para.as_mut() {
                    if p.nested == 0 && p.hyperlink_depth == 0 {
                        let j = p.run_idx;
                        p.run_idx += 1;
                        p.pending_rpr = p.patch.and_then(|pp| pp.runs.get(&j)).cloned();
                    }
                    p.depth += 1;
                }
                w.write_event(Event::Start(e))?;
            }
            b"w:hyperlink" => {
                if let Some(p) = self.para.as_mut() {
                    p.hyperlink_depth += 1;
                    p.depth += 1;
                }
                w.write_event(Event::Start(e))?;
            }
            b"w:sectPr" => {
                let idx = self.sect_idx;
                self.sect_idx += 1;
                if let Some(margins) = self.plan.sections.get(&idx) {
                    let inner = capture_subtree(reader, b"w:sectPr")?;
                    let children = patch_sectpr_children(group_children(inner), margins);
                    w.write_event(Event::Start(e))?;
                    emit_children(w, children)?;
                    w.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
                } else {
                    if let Some(p) = self.para.as_mut() {
                        p.depth += 1;
                    }
                    w.write_event(Event::Start(e))?;
                }
            }
            _ => {
                if let Some(p) = self.para.as_mut() {
                    p.depth += 1;
                }
                w.write_event(Event::Start(e))?;
            }
        }
        Ok(())
    }

    fn on_empty(&mut self, e: BytesStart<'_>, w: &mut Out) -> Result<()> {
        let name = e.name().as_ref().to_vec();
        let name = name.as_slice();

        if self.skipping() {
            w.write_event(Event::Empty(e))?;
            return Ok(());
        }

        if let Some(p) = self.para.as_mut() {
            if let Some(font) = p.pending_rpr.take() {
                // an empty rPr is replaced outright
                emit_events(w, synth_rpr_events(&font))?;
                if name == b"w:rPr" {
                    return Ok(());
                }
            }
        }

        let direct = self
            .para
            .as_ref()
            .map(|p| p.nested == 0 && p.depth == 0)
            .unwrap_or(false);

        match name {
            b"w:p" if self.para.is_none() => {
                let patch = self.plan.paragraphs.get(&self.para_idx);
                self.para_idx += 1;
                match patch {
                    Some(patch) if patch.has_ppr_changes() => {
                        w.write_event(Event::Start(e.clone()))?;
                        emit_events(w, synth_ppr_events(patch))?;
                        w.write_event(Event::End(BytesEnd::new("w:p")))?;
                    }
                    _ => w.write_event(Event::Empty(e))?,
                }
            }
            b"w:pPr" if direct && self.para.as_ref().map(|p| p.pending_ppr).unwrap_or(false) => {
                let patch = self.para.as_ref().and_then(|p| p.patch);
                if let Some(p) = self.para.as_mut() {
                    p.pending_ppr = false;
                }
                if let Some(patch) = patch {
                    w.write_event(Event::Start(e.clone()))?;
                    emit_events(w, synth_managed_ppr(patch))?;
                    w.write_event(Event::End(BytesEnd::new("w:pPr")))?;
                }
            }
            _ => {
                if direct && name != b"w:pPr" {
                    self.flush_pending_ppr(w)?;
                }
                w.write_event(Event::Empty(e))?;
            }
        }
        Ok(())
    }

    fn on_end(&mut self, e: BytesEnd<'_>, w: &mut Out) -> Result<()> {
        let name = e.name().as_ref().to_vec();
        let name = name.as_slice();

        match name {
            b"w:tbl" => {
                self.tbl_depth = self.tbl_depth.saturating_sub(1);
                w.write_event(Event::End(e))?;
                return Ok(());
            }
            b"w:txbxContent" => {
                self.txbx_depth = self.txbx_depth.saturating_sub(1);
                w.write_event(Event::End(e))?;
                return Ok(());
            }
            _ => {}
        }
        if self.skipping() {
            w.write_event(Event::End(e))?;
            return Ok(());
        }

        // a patched run that closed without properties gets them now
        if let Some(p) = self.para.as_mut() {
            if let Some(font) = p.pending_rpr.take() {
                emit_events(w, synth_rpr_events(&font))?;
            }
        }

        match name {
            b"w:p" => {
                let nested = self.para.as_ref().map(|p| p.nested > 0).unwrap_or(false);
                if nested {
                    if let Some(p) = self.para.as_mut() {
                        p.nested -= 1;
                        p.depth = p.depth.saturating_sub(1);
                    }
                } else {
                    // paragraph closed without any children
                    self.flush_pending_ppr(w)?;
                    self.para = None;
                }
                w.write_event(Event::End(e))?;
            }
            b"w:hyperlink" => {
                if let Some(p) = self.para.as_mut() {
                    p.hyperlink_depth = p.hyperlink_depth.saturating_sub(1);
                    p.depth = p.depth.saturating_sub(1);
                }
                w.write_event(Event::End(e))?;
            }
            _ => {
                if let Some(p) = self.para.as_mut() {
                    p.depth = p.depth.saturating_sub(1);
                }
                w.write_event(Event::End(e))?;
            }
        }
        Ok(())
    }

    fn flush_pending_ppr(&mut self, w: &mut Out) -> Result<()> {
        let Some(p) = self.para.as_mut() else {
            return Ok(());
        };
        if !p.pending_ppr {
            return Ok(());
        }
        p.pending_ppr = false;
        if let Some(patch) = p.patch {
            emit_events(w, synth_ppr_events(patch))?;
        }
        Ok(())
    }

    /// Apply paragraph-property replacements and injections, and patch any
    /// section break embedded in the paragraph properties.
    fn patch_ppr_children(&mut self, mut children: Vec<Child>, patch: &ParaPatch) -> Vec<Child> {
        for child in children.iter_mut() {
            if child.name == b"w:sectPr" {
                let idx = self.sect_idx;
                self.sect_idx += 1;
                if let Some(margins) = self.plan.sections.get(&idx) {
                    patch_sectpr_in_place(child, margins);
                }
            }
        }
        if let Some(spacing) = &patch.spacing {
            replace_or_insert(
                &mut children,
                b"w:spacing",
                Event::Empty(synth_spacing(spacing)),
                ppr_rank,
            );
        }
        if let Some(indent) = &patch.indent {
            replace_or_insert(
                &mut children,
                b"w:ind",
                Event::Empty(synth_ind(indent)),
                ppr_rank,
            );
        }
        if let Some(alignment) = patch.alignment {
            match jc_from_alignment(alignment) {
                Some(val) => replace_or_insert(
                    &mut children,
                    b"w:jc",
                    Event::Empty(synth_jc(val)),
                    ppr_rank,
                ),
                None => children.retain(|c| c.name != b"w:jc"),
            }
        }
        children
    }
}

/// One top-level child of a captured container, with its complete events.
#[derive(Debug)]
struct Child {
    name: Vec<u8>,
    events: Vec<Event<'static>>,
}

/// Read events until the matching end tag, returning the inner events owned.
fn capture_subtree(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<Vec<Event<'static>>> {
    let mut events = Vec::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                events.push(Event::Start(e.into_owned()));
            }
            Event::End(e) => {
                if depth == 0 && e.name().as_ref() == end {
                    break;
                }
                depth = depth.saturating_sub(1);
                events.push(Event::End(e.into_owned()));
            }
            Event::Eof => break,
            other => events.push(other.into_owned()),
        }
        buf.clear();
    }
    Ok(events)
}

/// Group a captured container's inner events by top-level child element.
/// Whitespace between children is dropped; the container is being rewritten
/// anyway.
fn group_children(events: Vec<Event<'static>>) -> Vec<Child> {
    let mut children: Vec<Child> = Vec::new();
    let mut current: Option<Child> = None;
    let mut depth = 0usize;
    for ev in events {
        match &ev {
            Event::Start(e) => {
                if depth == 0 {
                    current = Some(Child {
                        name: e.name().as_ref().to_vec(),
                        events: Vec::new(),
                    });
                }
                depth += 1;
                if let Some(c) = current.as_mut() {
                    c.events.push(ev);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if let Some(c) = current.as_mut() {
                    c.events.push(ev);
                }
                if depth == 0 {
                    if let Some(c) = current.take() {
                        children.push(c);
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    children.push(Child {
                        name: e.name().as_ref().to_vec(),
                        events: vec![ev],
                    });
                } else if let Some(c) = current.as_mut() {
                    c.events.push(ev);
                }
            }
            _ => {
                if let Some(c) = current.as_mut() {
                    c.events.push(ev);
                }
            }
        }
    }
    children
}

/// Replace an existing child in place or insert a new one at its schema
/// position.
fn replace_or_insert(
    children: &mut Vec<Child>,
    name: &[u8],
    event: Event<'static>,
    rank: fn(&[u8]) -> usize,
) {
    if let Some(child) = children.iter_mut().find(|c| c.name == name) {
        child.events = vec![event];
        return;
    }
    let r = rank(name);
    let pos = children
        .iter()
        .position(|c| rank(&c.name) > r)
        .unwrap_or(children.len());
    children.insert(
        pos,
        Child {
            name: name.to_vec(),
            events: vec![event],
        },
    );
}

fn patch_rpr_children(mut children: Vec<Child>, font: &RunFont) -> Vec<Child> {
    if let Some(name) = &font.name {
        let existing = children
            .iter()
            .find(|c| c.name == b"w:rFonts")
            .and_then(|c| leading_start(&c.events))
            .cloned();
        replace_or_insert(
            &mut children,
            b"w:rFonts",
            Event::Empty(synth_rfonts(existing.as_ref(), name)),
            rpr_rank,
        );
    }
    if let Some(size) = font.size {
        replace_or_insert(&mut children, b"w:sz", Event::Empty(synth_sz(size)), rpr_rank);
    }
    children
}

fn patch_sectpr_children(mut children: Vec<Child>, margins: &Margins) -> Vec<Child> {
    let existing = children
        .iter()
        .find(|c| c.name == b"w:pgMar")
        .and_then(|c| leading_start(&c.events))
        .cloned();
    replace_or_insert(
        &mut children,
        b"w:pgMar",
        Event::Empty(synth_pgmar(existing.as_ref(), margins)),
        sectpr_rank,
    );
    children
}

/// Patch margins inside a section break captured as a pPr child.
fn patch_sectpr_in_place(child: &mut Child, margins: &Margins) {
    if child.events.len() == 1 {
        if let Event::Empty(start) = &child.events[0] {
            let start = start.clone();
            child.events = vec![
                Event::Start(start),
                Event::Empty(synth_pgmar(None, margins)),
                Event::End(BytesEnd::new("w:sectPr")),
            ];
        }
        return;
    }
    let Some(end) = child.events.pop() else { return };
    if child.events.is_empty() {
        child.events.push(end);
        return;
    }
    let start = child.events.remove(0);
    let inner = std::mem::take(&mut child.events);
    let patched = patch_sectpr_children(group_children(inner), margins);
    let mut events = vec![start];
    for c in patched {
        events.extend(c.events);
    }
    events.push(end);
    child.events = events;
}

fn leading_start<'a>(events: &'a [Event<'static>]) -> Option<&'a BytesStart<'static>> {
    match events.first() {
        Some(Event::Start(e)) | Some(Event::Empty(e)) => Some(e),
        _ => None,
    }
}

fn emit_events(w: &mut Out, events: Vec<Event<'static>>) -> Result<()> {
    for ev in events {
        w.write_event(ev)?;
    }
    Ok(())
}

fn emit_children(w: &mut Out, children: Vec<Child>) -> Result<()> {
    for c in children {
        emit_events(w, c.events)?;
    }
    Ok(())
}

fn synth_ppr_events(patch: &ParaPatch) -> Vec<Event<'static>> {
    let mut events = vec![Event::Start(BytesStart::new("w:pPr"))];
    events.extend(synth_managed_ppr(patch));
    events.push(Event::End(BytesEnd::new("w:pPr")));
    events
}

/// Managed paragraph-property elements in schema order.
fn synth_managed_ppr(patch: &ParaPatch) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    if let Some(spacing) = &patch.spacing {
        events.push(Event::Empty(synth_spacing(spacing)));
    }
    if let Some(indent) = &patch.indent {
        events.push(Event::Empty(synth_ind(indent)));
    }
    if let Some(val) = patch.alignment.and_then(jc_from_alignment) {
        events.push(Event::Empty(synth_jc(val)));
    }
    events
}

fn synth_rpr_events(font: &RunFont) -> Vec<Event<'static>> {
    let mut events = vec![Event::Start(BytesStart::new("w:rPr"))];
    if let Some(name) = &font.name {
        events.push(Event::Empty(synth_rfonts(None, name)));
    }
    if let Some(size) = font.size {
        events.push(Event::Empty(synth_sz(size)));
    }
    events.push(Event::End(BytesEnd::new("w:rPr")));
    events
}

fn synth_spacing(s: &Spacing) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:spacing");
    if let Some(before) = s.before {
        e.push_attribute(("w:before", pt_to_twips(before).to_string().as_str()));
    }
    if let Some(after) = s.after {
        e.push_attribute(("w:after", pt_to_twips(after).to_string().as_str()));
    }
    if let Some(line) = s.line_spacing {
        match s.rule {
            Some(LineSpacingRule::Exact) => {
                e.push_attribute(("w:line", pt_to_twips(line).to_string().as_str()));
                e.push_attribute(("w:lineRule", "exact"));
            }
            Some(LineSpacingRule::AtLeast) => {
                e.push_attribute(("w:line", pt_to_twips(line).to_string().as_str()));
                e.push_attribute(("w:lineRule", "atLeast"));
            }
            _ => {
                e.push_attribute(("w:line", multiple_to_line_units(line).to_string().as_str()));
                e.push_attribute(("w:lineRule", "auto"));
            }
        }
    }
    e
}

fn synth_ind(indent: &Indent) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:ind");
    if let Some(left) = indent.left {
        e.push_attribute(("w:left", cm_to_twips(left).to_string().as_str()));
    }
    if let Some(right) = indent.right {
        e.push_attribute(("w:right", cm_to_twips(right).to_string().as_str()));
    }
    if let Some(first) = indent.first_line {
        if first >= 0.0 {
            e.push_attribute(("w:firstLine", cm_to_twips(first).to_string().as_str()));
        } else {
            e.push_attribute(("w:hanging", cm_to_twips(-first).to_string().as_str()));
        }
    }
    e
}

fn synth_jc(val: &str) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:jc");
    e.push_attribute(("w:val", val));
    e
}

fn synth_rfonts(original: Option<&BytesStart>, name: &str) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:rFonts");
    if let Some(orig) = original {
        for attr in orig.attributes().flatten() {
            let key = attr.key.as_ref();
            if key != b"w:ascii" && key != b"w:hAnsi" {
                e.push_attribute(attr);
            }
        }
    }
    e.push_attribute(("w:ascii", name));
    e.push_attribute(("w:hAnsi", name));
    e
}

fn synth_sz(size: f64) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:sz");
    e.push_attribute(("w:val", pt_to_half_points(size).to_string().as_str()));
    e
}

fn synth_pgmar(original: Option<&BytesStart>, margins: &Margins) -> BytesStart<'static> {
    let mut e = BytesStart::new("w:pgMar");
    let managed = [
        ("w:top", margins.top),
        ("w:bottom", margins.bottom),
        ("w:left", margins.left),
        ("w:right", margins.right),
    ];
    if let Some(orig) = original {
        for attr in orig.attributes().flatten() {
            let key = attr.key.as_ref();
            let overridden = managed
                .iter()
                .any(|(k, v)| k.as_bytes() == key && v.is_some());
            if !overridden {
                e.push_attribute(attr);
            }
        }
    }
    for (k, v) in managed {
        if let Some(cm) = v {
            e.push_attribute((k, cm_to_twips(cm).to_string().as_str()));
        }
    }
    e
}

/// CT_PPr child sequence.
const PPR_ORDER: &[&[u8]] = &[
    b"w:pStyle",
    b"w:keepNext",
    b"w:keepLines",
    b"w:pageBreakBefore",
    b"w:framePr",
    b"w:widowControl",
    b"w:numPr",
    b"w:suppressLineNumbers",
    b"w:pBdr",
    b"w:shd",
    b"w:tabs",
    b"w:suppressAutoHyphens",
    b"w:kinsoku",
    b"w:wordWrap",
    b"w:overflowPunct",
    b"w:topLinePunct",
    b"w:autoSpaceDE",
    b"w:autoSpaceDN",
    b"w:bidi",
    b"w:adjustRightInd",
    b"w:snapToGrid",
    b"w:spacing",
    b"w:ind",
    b"w:contextualSpacing",
    b"w:mirrorIndents",
    b"w:suppressOverlap",
    b"w:jc",
    b"w:textDirection",
    b"w:textAlignment",
    b"w:textboxTightWrap",
    b"w:outlineLvl",
    b"w:divId",
    b"w:cnfStyle",
    b"w:rPr",
    b"w:sectPr",
    b"w:pPrChange",
];

/// CT_RPr child sequence.
const RPR_ORDER: &[&[u8]] = &[
    b"w:rStyle",
    b"w:rFonts",
    b"w:b",
    b"w:bCs",
    b"w:i",
    b"w:iCs",
    b"w:caps",
    b"w:smallCaps",
    b"w:strike",
    b"w:dstrike",
    b"w:outline",
    b"w:shadow",
    b"w:emboss",
    b"w:imprint",
    b"w:noProof",
    b"w:snapToGrid",
    b"w:vanish",
    b"w:webHidden",
    b"w:color",
    b"w:spacing",
    b"w:w",
    b"w:kern",
    b"w:position",
    b"w:sz",
    b"w:szCs",
    b"w:highlight",
    b"w:u",
    b"w:effect",
    b"w:bdr",
    b"w:shd",
    b"w:fitText",
    b"w:vertAlign",
    b"w:rtl",
    b"w:cs",
    b"w:em",
    b"w:lang",
    b"w:eastAsianLayout",
    b"w:specVanish",
];

/// CT_SectPr child sequence.
const SECTPR_ORDER: &[&[u8]] = &[
    b"w:headerReference",
    b"w:footerReference",
    b"w:footnotePr",
    b"w:endnotePr",
    b"w:type",
    b"w:pgSz",
    b"w:pgMar",
    b"w:paperSrc",
    b"w:pgBorders",
    b"w:lnNumType",
    b"w:pgNumType",
    b"w:cols",
    b"w:formProt",
    b"w:vAlign",
    b"w:noEndnote",
    b"w:titlePg",
    b"w:textDirection",
    b"w:bidi",
    b"w:rtlGutter",
    b"w:docGrid",
    b"w:printerSettings",
    b"w:sectPrChange",
];

fn ppr_rank(name: &[u8]) -> usize {
    PPR_ORDER.iter().position(|n| *n == name).unwrap_or(usize::MAX)
}

fn rpr_rank(name: &[u8]) -> usize {
    RPR_ORDER.iter().position(|n| *n == name).unwrap_or(usize::MAX)
}

fn sectpr_rank(name: &[u8]) -> usize {
    SECTPR_ORDER.iter().position(|n| *n == name).unwrap_or(usize::MAX)
}
