//! WGSL front end shared by every backend: compile each stage with naga,
//! check that the stages link, and flatten uniform globals into named slots.
//!
//! Resource conventions:
//! - `var<uniform>` globals live in group 0, one binding per global;
//! - textures live in group 1 at bindings `0..MAX_TEXTURE_UNITS` (binding == unit);
//! - the single sampler lives in group 1 at binding [`SAMPLER_BINDING`].

use std::collections::BTreeMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{
    AddressSpace, ArraySize, Binding, Handle, Module, Scalar, ScalarKind, ShaderStage, Type,
    TypeInner, VectorSize,
};

use crate::error::{ShaderError, Stage};
use crate::gpu::{MAX_TEXTURE_UNITS, UniformInfo, UniformLocation};
use crate::uniform::UniformKind;

pub const UNIFORM_GROUP: u32 = 0;
pub const TEXTURE_GROUP: u32 = 1;
pub const SAMPLER_BINDING: u32 = MAX_TEXTURE_UNITS;

/// One scalar/vector/matrix leaf inside a uniform binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub kind: UniformKind,
    pub binding: u32,
    pub offset: u32,
}

/// One `var<uniform>` global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformBlock {
    pub binding: u32,
    pub name: String,
    /// Buffer size, rounded up to 16 bytes.
    pub size: u32,
}

/// Everything a backend needs to know about a linked program.
#[derive(Clone, Debug)]
pub struct ProgramLayout {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Sorted by binding.
    pub blocks: Vec<UniformBlock>,
    /// Location `i` is `uniforms[i]`.
    pub uniforms: Vec<UniformSlot>,
    /// Texture bindings (== units) the fragment stage declares.
    pub textures: Vec<u32>,
}

impl ProgramLayout {
    pub fn uniform_infos(&self) -> Vec<UniformInfo> {
        self.uniforms
            .iter()
            .enumerate()
            .map(|(i, slot)| UniformInfo {
                name: slot.name.clone(),
                kind: slot.kind,
                location: UniformLocation(i as u32),
            })
            .collect()
    }

    pub fn block(&self, binding: u32) -> Option<&UniformBlock> {
        self.blocks.iter().find(|b| b.binding == binding)
    }
}

/// Parse and validate one stage.
pub fn compile(stage: Stage, source: &str) -> Result<Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;

    Ok(module)
}

/// Compile both stages and check that they form a usable program.
pub fn link(vertex_source: &str, fragment_source: &str) -> Result<ProgramLayout, ShaderError> {
    let vs = compile(Stage::Vertex, vertex_source)?;
    let fs = compile(Stage::Fragment, fragment_source)?;

    let vs_entry = vs
        .entry_points
        .iter()
        .find(|ep| ep.stage == ShaderStage::Vertex)
        .ok_or_else(|| link_error("vertex source has no @vertex entry point"))?;
    let fs_entry = fs
        .entry_points
        .iter()
        .find(|ep| ep.stage == ShaderStage::Fragment)
        .ok_or_else(|| link_error("fragment source has no @fragment entry point"))?;

    let mut inputs = Vec::new();
    for arg in &vs_entry.function.arguments {
        collect_locations(&vs, arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    for (location, inner) in &inputs {
        let expected = vertex_attribute(*location).ok_or_else(|| {
            link_error(format!(
                "vertex input @location({location}) is not provided by the vertex layout"
            ))
        })?;
        if *inner != expected {
            return Err(link_error(format!(
                "vertex input @location({location}) is {inner:?}, the vertex layout provides {expected:?}"
            )));
        }
    }

    let mut varyings = Vec::new();
    if let Some(result) = &vs_entry.function.result {
        collect_locations(&vs, result.ty, result.binding.as_ref(), &mut varyings);
    }
    let mut fs_inputs = Vec::new();
    for arg in &fs_entry.function.arguments {
        collect_locations(&fs, arg.ty, arg.binding.as_ref(), &mut fs_inputs);
    }
    for (location, inner) in &fs_inputs {
        match varyings.iter().find(|(l, _)| l == location) {
            Some((_, produced)) if produced == inner => {}
            Some((_, produced)) => {
                return Err(link_error(format!(
                    "fragment input @location({location}) is {inner:?}, vertex output is {produced:?}"
                )));
            }
            None => {
                return Err(link_error(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
        }
    }

    let mut blocks: BTreeMap<u32, (UniformBlock, Vec<UniformSlot>)> = BTreeMap::new();
    let mut textures = Vec::new();
    for (stage, module) in [(Stage::Vertex, &vs), (Stage::Fragment, &fs)] {
        for (_, var) in module.global_variables.iter() {
            let name = var.name.clone().unwrap_or_default();
            let binding = var.binding.as_ref();
            match var.space {
                AddressSpace::Uniform => {
                    let Some(rb) = binding.filter(|rb| rb.group == UNIFORM_GROUP) else {
                        return Err(link_error(format!(
                            "{stage} uniform '{name}' must be declared in @group({UNIFORM_GROUP})"
                        )));
                    };
                    let mut slots = Vec::new();
                    flatten(module, var.ty, name.clone(), 0, rb.binding, &mut slots)
                        .map_err(|log| ShaderError::Link { log })?;
                    let block = UniformBlock {
                        binding: rb.binding,
                        name,
                        size: round_up_16(type_size(module, var.ty)),
                    };
                    match blocks.get(&rb.binding) {
                        Some((seen, seen_slots)) if *seen != block || *seen_slots != slots => {
                            return Err(link_error(format!(
                                "uniform binding {} is '{}' in one stage and '{}' in the other, or their layouts differ",
                                rb.binding, seen.name, block.name
                            )));
                        }
                        Some(_) => {}
                        None => {
                            blocks.insert(rb.binding, (block, slots));
                        }
                    }
                }
                AddressSpace::Handle => {
                    let Some(rb) = binding.filter(|rb| rb.group == TEXTURE_GROUP) else {
                        return Err(link_error(format!(
                            "{stage} resource '{name}' must be declared in @group({TEXTURE_GROUP})"
                        )));
                    };
                    match module.types[var.ty].inner {
                        TypeInner::Image { .. } if rb.binding < MAX_TEXTURE_UNITS => {
                            if !textures.contains(&rb.binding) {
                                textures.push(rb.binding);
                            }
                        }
                        TypeInner::Sampler { .. } if rb.binding == SAMPLER_BINDING => {}
                        _ => {
                            return Err(link_error(format!(
                                "{stage} resource '{name}' at binding {} does not match the texture unit layout",
                                rb.binding
                            )));
                        }
                    }
                }
                AddressSpace::Private | AddressSpace::WorkGroup | AddressSpace::Function => {}
                ref other => {
                    return Err(link_error(format!(
                        "{stage} global '{name}' uses unsupported address space {other:?}"
                    )));
                }
            }
        }
    }
    textures.sort_unstable();

    let mut layout = ProgramLayout {
        vertex_entry: vs_entry.name.clone(),
        fragment_entry: fs_entry.name.clone(),
        blocks: Vec::with_capacity(blocks.len()),
        uniforms: Vec::new(),
        textures,
    };
    for (_, (block, slots)) in blocks {
        layout.blocks.push(block);
        layout.uniforms.extend(slots);
    }
    Ok(layout)
}

fn link_error(log: impl Into<String>) -> ShaderError {
    ShaderError::Link { log: log.into() }
}

/// Layout of [`crate::mesh::Vertex`].
fn vertex_attribute(location: u32) -> Option<TypeInner> {
    let vec = |size| TypeInner::Vector {
        size,
        scalar: Scalar::F32,
    };
    match location {
        0 | 1 => Some(vec(VectorSize::Tri)),
        2 => Some(vec(VectorSize::Bi)),
        _ => None,
    }
}

/// `@location` bindings of an argument or result, looking through IO structs.
fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(u32, TypeInner)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.push((*location, module.types[ty].inner.clone()));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn leaf_kind(inner: &TypeInner) -> Option<UniformKind> {
    let kind_of_size = |size: VectorSize, small, mid, big| match size {
        VectorSize::Bi => small,
        VectorSize::Tri => mid,
        VectorSize::Quad => big,
    };
    match *inner {
        TypeInner::Scalar(Scalar {
            kind: ScalarKind::Sint | ScalarKind::Uint,
            width: 4,
        }) => Some(UniformKind::Int),
        TypeInner::Scalar(Scalar::F32) => Some(UniformKind::Float),
        TypeInner::Vector {
            size,
            scalar: Scalar::F32,
        } => Some(kind_of_size(
            size,
            UniformKind::Vec2,
            UniformKind::Vec3,
            UniformKind::Vec4,
        )),
        TypeInner::Matrix {
            columns,
            rows,
            scalar: Scalar::F32,
        } if columns == rows => Some(kind_of_size(
            columns,
            UniformKind::Mat2,
            UniformKind::Mat3,
            UniformKind::Mat4,
        )),
        _ => None,
    }
}

/// GL-style flattening: `block.field`, `block[i].field`, nested as deep as the type goes.
fn flatten(
    module: &Module,
    ty: Handle<Type>,
    name: String,
    offset: u32,
    binding: u32,
    out: &mut Vec<UniformSlot>,
) -> Result<(), String> {
    let inner = &module.types[ty].inner;
    if let Some(kind) = leaf_kind(inner) {
        out.push(UniformSlot {
            name,
            kind,
            binding,
            offset,
        });
        return Ok(());
    }

    match *inner {
        TypeInner::Struct { ref members, .. } => {
            for m in members {
                let field = m.name.as_deref().unwrap_or("_");
                flatten(
                    module,
                    m.ty,
                    format!("{name}.{field}"),
                    offset + m.offset,
                    binding,
                    out,
                )?;
            }
            Ok(())
        }
        TypeInner::Array {
            base,
            size: ArraySize::Constant(count),
            stride,
        } => {
            for i in 0..count.get() {
                flatten(
                    module,
                    base,
                    format!("{name}[{i}]"),
                    offset + i * stride,
                    binding,
                    out,
                )?;
            }
            Ok(())
        }
        ref other => Err(format!("uniform '{name}' has unsupported type {other:?}")),
    }
}

fn type_size(module: &Module, ty: Handle<Type>) -> u32 {
    match module.types[ty].inner {
        TypeInner::Scalar(s) => s.width as u32,
        TypeInner::Vector { size, scalar } => size as u32 * scalar.width as u32,
        TypeInner::Matrix {
            columns,
            rows,
            scalar,
        } => {
            let column = (if rows == VectorSize::Bi { 2 } else { 4 }) * scalar.width as u32;
            columns as u32 * column
        }
        TypeInner::Array {
            size: ArraySize::Constant(count),
            stride,
            ..
        } => count.get() * stride,
        TypeInner::Struct { span, .. } => span,
        _ => 0,
    }
}

fn round_up_16(size: u32) -> u32 {
    size.max(16).div_ceil(16) * 16
}
