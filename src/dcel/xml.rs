// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// XML serialization of the vertex, edge and face tables.
//
//   <dcel>
//     <vertices>  <vertex index='i'> <outedge/> <location> <x/> <y/> ...
//     <edges>     <edge index='i'> <origin/> <twin/> <incface/> <next/> <prev/>
//     <faces>     <face index='i'> [<ocomponent>] <icomponents> ...
//
// Each coordinate is <rational><numerator/><denominator/></rational>.

use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::Zero;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{Dcel, EdgeRecord, FaceRecord, VertexRecord};
use crate::error::DcelError;
use crate::geom::{Rat, RatPoint};

const DECLARATION: &str = "<?xml version='1.0' ?>\n";

fn xml_err(e: impl std::fmt::Display) -> DcelError {
    DcelError::Xml(e.to_string())
}

// ─────────────────────────── Writing ───────────────────────────

struct XmlOut<'a> {
    w: Writer<&'a mut Vec<u8>>,
}

impl XmlOut<'_> {
    fn open(&mut self, name: &str, index: Option<usize>) -> Result<(), DcelError> {
        let mut start = BytesStart::new(name);
        if let Some(i) = index {
            start.push_attribute(("index", i.to_string().as_str()));
        }
        self.w.write_event(Event::Start(start)).map_err(xml_err)
    }

    fn close(&mut self, name: &str) -> Result<(), DcelError> {
        self.w
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_err)
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<(), DcelError> {
        self.open(name, None)?;
        self.w
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)?;
        self.close(name)
    }

    fn rational(&mut self, name: &str, r: &Rat) -> Result<(), DcelError> {
        self.open(name, None)?;
        self.open("rational", None)?;
        self.leaf("numerator", &r.numer().to_string())?;
        self.leaf("denominator", &r.denom().to_string())?;
        self.close("rational")?;
        self.close(name)
    }
}

impl Dcel {
    pub fn to_xml(&self) -> Result<String, DcelError> {
        let mut buf = DECLARATION.as_bytes().to_vec();
        {
            let mut out = XmlOut {
                w: Writer::new_with_indent(&mut buf, b' ', 2),
            };
            self.write_tables(&mut out)?;
        }
        String::from_utf8(buf).map_err(xml_err)
    }

    fn write_tables(&self, out: &mut XmlOut<'_>) -> Result<(), DcelError> {
        out.open("dcel", None)?;

        out.open("vertices", None)?;
        for (i, v) in self.vertices.iter().enumerate() {
            out.open("vertex", Some(i))?;
            out.leaf("outedge", &v.outedge.to_string())?;
            out.open("location", None)?;
            out.rational("x", &v.location.x)?;
            out.rational("y", &v.location.y)?;
            out.close("location")?;
            out.close("vertex")?;
        }
        out.close("vertices")?;

        out.open("edges", None)?;
        for (i, e) in self.edges.iter().enumerate() {
            out.open("edge", Some(i))?;
            out.leaf("origin", &e.origin.to_string())?;
            out.leaf("twin", &e.twin.to_string())?;
            out.leaf("incface", &e.incface.to_string())?;
            out.leaf("next", &e.next.to_string())?;
            out.leaf("prev", &e.prev.to_string())?;
            out.close("edge")?;
        }
        out.close("edges")?;

        out.open("faces", None)?;
        for (i, f) in self.faces.iter().enumerate() {
            out.open("face", Some(i))?;
            if let Some(e) = f.outer_component {
                out.open("ocomponent", None)?;
                out.leaf("edgeindex", &e.to_string())?;
                out.close("ocomponent")?;
            }
            out.open("icomponents", None)?;
            for e in &f.inner_components {
                out.leaf("edgeindex", &e.to_string())?;
            }
            out.close("icomponents")?;
            out.close("face")?;
        }
        out.close("faces")?;

        out.close("dcel")
    }
}

// ─────────────────────────── Reading ───────────────────────────

#[derive(Debug, Default)]
struct Element {
    name: String,
    index: Option<usize>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, DcelError> {
        let mut el = Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Element::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            if attr.key.as_ref() == b"index" {
                let raw = std::str::from_utf8(&attr.value).map_err(xml_err)?;
                el.index = Some(raw.trim().parse().map_err(xml_err)?);
            }
        }
        Ok(el)
    }

    fn child(&self, name: &str) -> Result<&Element, DcelError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DcelError::Xml(format!("<{}> has no <{}>", self.name, name)))
    }

    fn optional_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn value<T: FromStr>(&self) -> Result<T, DcelError>
    where
        T::Err: std::fmt::Display,
    {
        self.text
            .trim()
            .parse()
            .map_err(|e| DcelError::Xml(format!("<{}>: {}", self.name, e)))
    }

    fn field<T: FromStr>(&self, name: &str) -> Result<T, DcelError>
    where
        T::Err: std::fmt::Display,
    {
        self.child(name)?.value()
    }

    /// Records named `name`, checking their index attributes run 0, 1, 2, ...
    fn sequence<'a>(
        &'a self,
        name: &'static str,
    ) -> Result<Vec<&'a Element>, DcelError> {
        let mut out = Vec::new();
        for (expected, el) in self.children_named(name).enumerate() {
            match el.index {
                Some(found) if found == expected => out.push(el),
                Some(found) => {
                    return Err(DcelError::IndexOutOfSequence {
                        element: name,
                        expected,
                        found,
                    })
                }
                None => return Err(DcelError::Xml(format!("<{name}> without index"))),
            }
        }
        Ok(out)
    }

    fn rational(&self) -> Result<Rat, DcelError> {
        let r = self.child("rational")?;
        let n: BigInt = r.field("numerator")?;
        let d: BigInt = r.field("denominator")?;
        if d.is_zero() {
            return Err(DcelError::ZeroDenominator);
        }
        Ok(Rat::new(n, d))
    }
}

fn parse_tree(xml: &str) -> Result<Element, DcelError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut stack = vec![Element::default()];
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let el = Element::open(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(el);
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_err)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text.trim());
                }
            }
            Event::End(_) => {
                let el = stack.pop().ok_or_else(|| xml_err("unbalanced end tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| xml_err("unbalanced end tag"))?;
                parent.children.push(el);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(xml_err("unclosed element")),
    }
}

impl Dcel {
    /// Read tables written by `to_xml` and check them.
    pub fn from_xml(xml: &str) -> Result<Dcel, DcelError> {
        let root = parse_tree(xml)?;
        let dcel = root.child("dcel")?;

        let mut vertices = Vec::new();
        for v in dcel.child("vertices")?.sequence("vertex")? {
            let loc = v.child("location")?;
            vertices.push(VertexRecord {
                outedge: v.field("outedge")?,
                location: RatPoint::new(loc.child("x")?.rational()?, loc.child("y")?.rational()?),
            });
        }

        let mut edges = Vec::new();
        for e in dcel.child("edges")?.sequence("edge")? {
            edges.push(EdgeRecord {
                origin: e.field("origin")?,
                twin: e.field("twin")?,
                incface: e.field("incface")?,
                next: e.field("next")?,
                prev: e.field("prev")?,
            });
        }

        let mut faces = Vec::new();
        for f in dcel.child("faces")?.sequence("face")? {
            let outer_component = match f.optional_child("ocomponent") {
                Some(o) => Some(o.field("edgeindex")?),
                None => None,
            };
            let mut inner_components = Vec::new();
            if let Some(inner) = f.optional_child("icomponents") {
                for e in inner.children_named("edgeindex") {
                    inner_components.push(e.value()?);
                }
            }
            faces.push(FaceRecord {
                outer_component,
                inner_components,
            });
        }

        Dcel::from_tables(vertices, edges, faces)
    }
}
