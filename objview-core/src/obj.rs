/// Line tokenizers for OBJ geometry files and MTL material libraries
///
/// Each line becomes one tagged record. The keyword is the first
/// whitespace-delimited token and must start at column 0; a line that starts
/// with whitespace, or is blank, is not a record of any kind. Numeric fields
/// that are missing or malformed read as 0.
use nom::{
    bytes::complete::take_till1,
    character::complete::digit1,
    number::complete::float,
    IResult,
};

use crate::vector::Vector3;

/// One line of a geometry file
#[derive(Debug, Clone, PartialEq)]
pub enum ObjRecord<'a> {
    /// `v x y z`
    Vertex(Vector3),
    /// `vt u v w`
    TexCoord(Vector3),
    /// `vn x y z`
    Normal(Vector3),
    /// `mtllib name`
    LibraryRef(&'a str),
    /// `g name`
    Group(&'a str),
    /// `f a b c ...`, the leading vertex index of each token, still 1-based
    Face(Vec<u32>),
    /// `usemtl name`
    UseMaterial(&'a str),
    Unknown,
}

impl<'a> ObjRecord<'a> {
    pub fn parse(line: &'a str) -> Self {
        let Ok((rest, keyword)) = keyword(line) else {
            return ObjRecord::Unknown;
        };

        let mut chars = keyword.chars();
        match (chars.next(), chars.next()) {
            (Some('v'), None) => ObjRecord::Vertex(vector(rest)),
            (Some('v'), Some('t')) => ObjRecord::TexCoord(vector(rest)),
            (Some('v'), Some('n')) => ObjRecord::Normal(vector(rest)),
            (Some('m'), _) => ObjRecord::LibraryRef(rest.trim()),
            (Some('g'), _) => ObjRecord::Group(rest.trim()),
            (Some('f'), _) => ObjRecord::Face(face_indices(rest)),
            (Some('u'), _) => ObjRecord::UseMaterial(rest.trim()),
            _ => ObjRecord::Unknown,
        }
    }
}

/// One line of a material library
#[derive(Debug, Clone, PartialEq)]
pub enum MtlRecord<'a> {
    /// `newmtl name`
    NewMaterial(&'a str),
    /// `Ns value`
    SpecularExponent(f32),
    /// `Ni value`
    RefractionIndex(f32),
    /// `Ka r g b`
    Ambient([f32; 3]),
    /// `Kd r g b`
    Diffuse([f32; 3]),
    /// `Ks r g b`, and any other `K` line
    Specular([f32; 3]),
    /// `d value`
    Transparency(f32),
    /// `illum model`
    Illumination(u32),
    /// An `N` line other than `Ns`/`Ni`; part of a block but carries nothing
    Ignored,
    /// Anything else. Ends a material block.
    Other,
}

impl<'a> MtlRecord<'a> {
    pub fn parse(line: &'a str) -> Self {
        let Ok((rest, keyword)) = keyword(line) else {
            return MtlRecord::Other;
        };

        let mut chars = keyword.chars();
        match (chars.next(), chars.next()) {
            (Some('n'), _) => MtlRecord::NewMaterial(rest.trim()),
            (Some('N'), Some('s')) => MtlRecord::SpecularExponent(first_number(rest)),
            (Some('N'), Some('i')) => MtlRecord::RefractionIndex(first_number(rest)),
            (Some('N'), _) => MtlRecord::Ignored,
            (Some('K'), Some('a')) => MtlRecord::Ambient(color(rest)),
            (Some('K'), Some('d')) => MtlRecord::Diffuse(color(rest)),
            (Some('K'), _) => MtlRecord::Specular(color(rest)),
            (Some('d'), _) => MtlRecord::Transparency(first_number(rest)),
            (Some('i'), _) => MtlRecord::Illumination(
                rest.split_whitespace().next().and_then(leading_integer).unwrap_or(0),
            ),
            _ => MtlRecord::Other,
        }
    }
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn number(token: &str) -> f32 {
    float::<_, nom::error::Error<&str>>(token)
        .map(|(_, value)| value)
        .unwrap_or(0.0)
}

fn leading_integer(token: &str) -> Option<u32> {
    let (_, digits) = digit1::<_, nom::error::Error<&str>>(token).ok()?;
    digits.parse().ok()
}

fn numbers<const N: usize>(fields: &str) -> [f32; N] {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(fields.split_whitespace()) {
        *slot = number(token);
    }
    out
}

fn first_number(fields: &str) -> f32 {
    let [value] = numbers::<1>(fields);
    value
}

fn color(fields: &str) -> [f32; 3] {
    numbers::<3>(fields)
}

fn vector(fields: &str) -> Vector3 {
    let [x, y, z] = numbers::<3>(fields);
    Vector3::new(x, y, z)
}

/// Only the vertex index of a `v/vt/vn` token is kept
fn face_indices(fields: &str) -> Vec<u32> {
    fields
        .split_whitespace()
        .filter_map(|token| {
            let index = leading_integer(token);
            if index.is_none() {
                log::warn!("skipping face token without a vertex index: {token:?}");
            }
            index
        })
        .collect()
}
