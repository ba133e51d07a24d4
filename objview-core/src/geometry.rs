/// Triangle meshes loaded from OBJ geometry files
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::buffer::{BufferAllocator, BufferObject, BufferTarget};
use crate::error::LoadError;
use crate::fmt::general;
use crate::material::Material;
use crate::obj::ObjRecord;
use crate::vector::Vector3;

/// Faces of a mesh that share one material
#[derive(Debug, Default)]
pub struct TriangleGroup {
    pub name: String,
    /// 0-based indices into the mesh vertices, three per triangle
    pub indices: Vec<u32>,
    pub material: Material,
    index_buffer: Option<BufferObject>,
}

impl TriangleGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a face given its 1-based file indices
    pub fn push_face(&mut self, file_indices: &[u32]) {
        for &index in file_indices {
            match index.checked_sub(1) {
                Some(index) => self.indices.push(index),
                None => log::warn!("group `{}`: skipping vertex index 0", self.name),
            }
        }
    }

    /// Complete triangles; a trailing partial triangle is not yielded
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn index_buffer(&self) -> Option<&BufferObject> {
        self.index_buffer.as_ref()
    }
}

impl fmt::Display for TriangleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# OF INDICES FOR GROUP: {}", self.indices.len())?;
        writeln!(f, "{}", "-".repeat(23))?;
        write!(f, "f")?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 && i % 3 == 0 {
                write!(f, "\nf")?;
            }
            write!(f, "{index:>5}")?;
        }
        write!(f, "\n\n{}", self.material)
    }
}

/// A mesh with one shared vertex array and any number of material groups.
///
/// Positions come from the file; normals are always computed by
/// [`Mesh::calculate_normals`] and stay index-aligned with the positions.
/// File-provided normals are ignored.
#[derive(Debug, Default)]
pub struct Mesh {
    positions: Vec<Vector3>,
    normals: Vec<Vector3>,
    tex_coords: Vec<Vector3>,
    groups: Vec<TriangleGroup>,
    vertex_buffer: Option<BufferObject>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let mut mesh = Self::new();
        mesh.open(path)?;
        Ok(mesh)
    }

    /// Replace the contents of this mesh with the geometry file at `path`.
    ///
    /// Whatever the mesh held before is released first. On error the mesh is
    /// left empty and may be opened again.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.close();

        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let base_dir = path.parent().unwrap_or(Path::new(""));
        *self = Self::parse(&source, base_dir)?;

        log::debug!(
            "loaded {}: {} vertices, {} texture coordinates, {} groups",
            path.display(),
            self.positions.len(),
            self.tex_coords.len(),
            self.groups.len()
        );
        Ok(())
    }

    /// Parse geometry source; material libraries resolve against `base_dir`.
    ///
    /// A group block runs from its `g` line up to the next `g` line. Inside
    /// a block only faces and material selections are read; outside of one
    /// only vertex data and library references are.
    fn parse(source: &str, base_dir: &Path) -> Result<Self, LoadError> {
        let mut mesh = Self::new();
        let mut library: Option<PathBuf> = None;
        let mut discarded_normals = 0;

        let mut records = source.lines().map(ObjRecord::parse).peekable();
        while let Some(record) = records.next() {
            match record {
                ObjRecord::Vertex(position) => mesh.positions.push(position),
                ObjRecord::TexCoord(tex_coord) => mesh.tex_coords.push(tex_coord),
                ObjRecord::Normal(_) => discarded_normals += 1,
                ObjRecord::LibraryRef(name) => library = Some(base_dir.join(name)),
                ObjRecord::Group(name) => {
                    let mut group = TriangleGroup::new(name);
                    while let Some(record) = records.next_if(|r| !matches!(r, ObjRecord::Group(_))) {
                        match record {
                            ObjRecord::Face(indices) => group.push_face(&indices),
                            ObjRecord::UseMaterial(material) => {
                                let Some(library) = &library else {
                                    return Err(LoadError::MissingMaterialLibrary {
                                        group: group.name,
                                        material: material.to_string(),
                                    });
                                };
                                group.material.open(library, material)?;
                            }
                            _ => {}
                        }
                    }
                    mesh.groups.push(group);
                }
                ObjRecord::Face(_) | ObjRecord::UseMaterial(_) | ObjRecord::Unknown => {}
            }
        }

        if discarded_normals > 0 {
            log::debug!("ignored {discarded_normals} file normals; they are recomputed");
        }
        Ok(mesh)
    }

    /// Compute area-weighted vertex normals.
    ///
    /// Every triangle's unnormalized face normal `(a - c) x (b - c)` is added
    /// to its three vertices, then each sum is normalized. Vertices no
    /// triangle references end up with NaN normals. Index lists are assumed
    /// to be triangulated; a trailing partial triangle is ignored.
    pub fn calculate_normals(&mut self) {
        let count = self.positions.len();
        self.normals.clear();
        self.normals.reserve(count);
        self.normals.resize(count, Vector3::default());

        for group in &self.groups {
            if group.indices.len() % 3 != 0 {
                log::warn!(
                    "group `{}` has {} indices; ignoring the trailing partial triangle",
                    group.name,
                    group.indices.len()
                );
            }
            for [a, b, c] in group.triangles() {
                let (a, b, c) = (a as usize, b as usize, c as usize);
                if a.max(b).max(c) >= count {
                    log::warn!(
                        "group `{}`: triangle {a} {b} {c} references a missing vertex",
                        group.name
                    );
                    continue;
                }
                let p = &self.positions;
                let normal = (p[a] - p[c]).cross_product(&(p[b] - p[c]));
                self.normals[a] += normal;
                self.normals[b] += normal;
                self.normals[c] += normal;
            }
        }

        for normal in &mut self.normals {
            *normal = normal.normalize();
        }
    }

    /// Upload the vertex array and every group's indices.
    ///
    /// Buffers from a previous upload are released. Call after
    /// [`Mesh::calculate_normals`].
    pub fn create_buffer_objects(&mut self, allocator: &Rc<dyn BufferAllocator>) {
        if self.normals.len() != self.positions.len() {
            log::warn!("uploading a mesh whose normals have not been calculated");
        }

        let vertices = self.vertex_data();
        self.vertex_buffer = Some(BufferObject::upload(
            allocator,
            BufferTarget::Vertex,
            bytemuck::cast_slice(&vertices),
        ));
        for group in &mut self.groups {
            group.index_buffer = Some(BufferObject::upload(
                allocator,
                BufferTarget::Index,
                bytemuck::cast_slice(&group.indices),
            ));
        }
        log::debug!(
            "uploaded {} vertices and {} index buffers",
            vertices.len(),
            self.groups.len()
        );
    }

    /// Release all vertex data, groups and buffers. Safe to call repeatedly.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    /// Vertex buffer contents: all positions followed by all normals
    pub fn vertex_data(&self) -> Vec<Vector3> {
        let mut data = Vec::with_capacity(self.positions.len() + self.normals.len());
        data.extend_from_slice(&self.positions);
        data.extend_from_slice(&self.normals);
        data
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        if self.positions.is_empty() {
            return format!("empty mesh, {} groups", self.groups.len());
        }
        let first = self.positions[0];
        let (min, max) = self.positions.iter().fold((first, first), |(lo, hi), p| {
            (
                Vector3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Vector3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        let triangles: usize = self.groups.iter().map(|g| g.indices.len() / 3).sum();
        format!(
            "{} vertices, {triangles} triangles in {} groups, bounds ({}, {}, {}) to ({}, {}, {})",
            self.positions.len(),
            self.groups.len(),
            general(min.x),
            general(min.y),
            general(min.z),
            general(max.x),
            general(max.y),
            general(max.z)
        )
    }

    /// Number of vertex positions read from the file
    pub fn num_verts(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Empty until [`Mesh::calculate_normals`] runs
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[Vector3] {
        &self.tex_coords
    }

    pub fn groups(&self) -> &[TriangleGroup] {
        &self.groups
    }

    pub fn vertex_buffer(&self) -> Option<&BufferObject> {
        self.vertex_buffer.as_ref()
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slashes = "/".repeat(68);
        let rule = "=".repeat(68);

        writeln!(f, "{slashes}")?;
        writeln!(f, "{:<15}: {}", "# OF VERTICES", self.positions.len())?;
        write!(f, "{:<15}: {}", "# OF GROUPS", self.groups.len())?;
        write!(f, "\n{rule}\nLIST OF VERTICES\n{}", "-".repeat(16))?;
        for position in &self.positions {
            write!(f, "\n{position}")?;
        }
        for group in &self.groups {
            write!(f, "\n{rule}\n{group}")?;
        }
        write!(f, "\n{slashes}")
    }
}
