/// Shading parameters read from a named block of an MTL library
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::fmt::general;
use crate::obj::MtlRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Shininess (`Ns`)
    pub specular_exponent: f32,
    /// `Ni`
    pub refraction_index: f32,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    /// Dissolve (`d`); 1 is fully opaque
    pub transparency: f32,
    pub illumination: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            specular_exponent: 0.0,
            refraction_index: 1.0,
            ambient: [0.0; 3],
            diffuse: [0.0; 3],
            specular: [0.0; 3],
            transparency: 1.0,
            illumination: 0,
        }
    }
}

impl Material {
    /// Read material `name` from the library at `path` into a default material
    pub fn load(path: impl AsRef<Path>, name: &str) -> Result<Self, LoadError> {
        let mut material = Self::default();
        material.open(path, name)?;
        Ok(material)
    }

    /// Overwrite fields with the values of material `name` in the library at `path`.
    ///
    /// Only an unreadable file is an error. If no block matches, the material
    /// keeps whatever values it already held.
    pub fn open(&mut self, path: impl AsRef<Path>, name: &str) -> Result<(), LoadError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        if !self.read_block(&source, name) {
            log::warn!("material `{name}` not found in {}", path.display());
        }
        Ok(())
    }

    /// Apply the first block whose `newmtl` line contains `name` anywhere.
    ///
    /// Matching is by substring of the whole line, so `abc` also selects a
    /// block declared as `abcdef`. The block ends at the first line that is
    /// not a recognized material field (a blank line, a comment or the next
    /// `newmtl`). Returns whether a block was found.
    pub fn read_block(&mut self, source: &str, name: &str) -> bool {
        let mut lines = source.lines();
        let found = lines
            .by_ref()
            .any(|line| matches!(MtlRecord::parse(line), MtlRecord::NewMaterial(_)) && line.contains(name));
        if !found {
            return false;
        }

        for line in lines {
            match MtlRecord::parse(line) {
                MtlRecord::SpecularExponent(value) => self.specular_exponent = value,
                MtlRecord::RefractionIndex(value) => self.refraction_index = value,
                MtlRecord::Ambient(rgb) => self.ambient = rgb,
                MtlRecord::Diffuse(rgb) => self.diffuse = rgb,
                MtlRecord::Specular(rgb) => self.specular = rgb,
                MtlRecord::Transparency(value) => self.transparency = value,
                MtlRecord::Illumination(model) => self.illumination = model,
                MtlRecord::Ignored => {}
                MtlRecord::NewMaterial(_) | MtlRecord::Other => break,
            }
        }
        true
    }
}

fn write_color(f: &mut fmt::Formatter<'_>, label: &str, tag: &str, rgb: &[f32; 3]) -> fmt::Result {
    writeln!(
        f,
        "{label:<22}{tag:<8}: [{:<10}, {:<10}, {:<10}]",
        general(rgb[0]),
        general(rgb[1]),
        general(rgb[2])
    )
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MATERIAL DATA")?;
        writeln!(f, "{}", "-".repeat(14))?;
        writeln!(
            f,
            "{:<22}{:<8}: {}",
            "Specular Exponent",
            "(ns)",
            general(self.specular_exponent)
        )?;
        writeln!(
            f,
            "{:<22}{:<8}: {}",
            "Index of Refraction",
            "(ni)",
            general(self.refraction_index)
        )?;
        write_color(f, "Ambience", "(ka)", &self.ambient)?;
        write_color(f, "Diffuse", "(kd)", &self.diffuse)?;
        write_color(f, "Specular", "(ks)", &self.specular)?;
        writeln!(f, "{:<22}{:<8}: {}", "Transparency", "(d)", general(self.transparency))?;
        write!(f, "{:<22}{:<8}: {}", "Illumination Model", "(illum)", self.illumination)
    }
}
