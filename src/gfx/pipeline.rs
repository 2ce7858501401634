//! Shader compilation and pipeline state construction.
//!
//! Shaders are opaque HLSL assets embedded at build time and compiled with
//! FXC at startup. A compile failure surfaces the compiler's diagnostic
//! text and is fatal. The pipeline state object bundles the compiled
//! bytecode with the fixed-function configuration; creation validates the
//! shader signatures against the vertex input layout, and the resulting
//! object is immutable and shared read-only by every recorded frame.

use std::mem::ManuallyDrop;
use tracing::debug;
use windows::{
    core::*, Win32::Graphics::Direct3D::Fxc::*, Win32::Graphics::Direct3D::*,
    Win32::Graphics::Direct3D12::*, Win32::Graphics::Dxgi::Common::*,
};

use crate::core::error::{GraphicsError, Result};
use crate::gfx::context::SURFACE_FORMAT;
use crate::render::vertex::{Vertex, COLOR_OFFSET};

/// Vertex shader source, entry point `main`, profile `vs_5_0`.
const VERTEX_SHADER: &str = include_str!("shaders/vertex.hlsl");

/// Pixel shader source, entry point `main`, profile `ps_5_0`.
const PIXEL_SHADER: &str = include_str!("shaders/pixel.hlsl");

/// The immutable pipeline configuration shared by every frame.
pub struct Pipeline {
    pub root_signature: ID3D12RootSignature,
    pub state: ID3D12PipelineState,
}

/// Compiles one HLSL source to bytecode.
///
/// On failure the returned error carries the compiler's diagnostic text,
/// which the caller surfaces to the user before terminating.
pub fn compile_shader(source: &str, entry_point: PCSTR, target: PCSTR) -> Result<ID3DBlob> {
    let mut bytecode: Option<ID3DBlob> = None;
    let mut diagnostics: Option<ID3DBlob> = None;

    let compiled = unsafe {
        D3DCompile(
            source.as_ptr() as _,
            source.len(),
            None,
            None,
            None,
            entry_point,
            target,
            0,
            0,
            &mut bytecode,
            Some(&mut diagnostics),
        )
    };

    if let Err(e) = compiled {
        let message = diagnostics
            .map(|blob| blob_to_string(&blob))
            .unwrap_or_else(|| format!("{:?}", e));
        return Err(GraphicsError::ShaderCompilation(message).into());
    }

    bytecode.ok_or_else(|| {
        GraphicsError::ShaderCompilation("compiler produced no bytecode".to_string()).into()
    })
}

fn blob_to_string(blob: &ID3DBlob) -> String {
    unsafe {
        let bytes =
            std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize());
        String::from_utf8_lossy(bytes).into_owned()
    }
}

impl Pipeline {
    /// Compiles both shaders and assembles the root signature and PSO.
    pub fn new(device: &ID3D12Device) -> Result<Self> {
        let vs = compile_shader(VERTEX_SHADER, s!("main"), s!("vs_5_0"))?;
        let ps = compile_shader(PIXEL_SHADER, s!("main"), s!("ps_5_0"))?;
        debug!("Shaders compiled");

        let root_signature = build_root_signature(device)?;
        let state = build_pipeline_state(device, &root_signature, &vs, &ps)?;
        debug!("Pipeline state created");

        Ok(Self {
            root_signature,
            state,
        })
    }
}

/// Builds the empty root signature: the shaders bind no resources, only
/// the input assembler is allowed.
fn build_root_signature(device: &ID3D12Device) -> Result<ID3D12RootSignature> {
    let desc = D3D12_ROOT_SIGNATURE_DESC {
        NumParameters: 0,
        pParameters: std::ptr::null(),
        NumStaticSamplers: 0,
        pStaticSamplers: std::ptr::null(),
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
    };

    unsafe {
        let mut serialized: Option<ID3DBlob> = None;
        D3D12SerializeRootSignature(&desc, D3D_ROOT_SIGNATURE_VERSION_1, &mut serialized, None)
            .map_err(|e| {
                GraphicsError::ResourceCreation(format!("root signature serialize: {:?}", e))
            })?;
        let serialized = serialized.ok_or_else(|| {
            GraphicsError::ResourceCreation("root signature serialization empty".to_string())
        })?;

        device
            .CreateRootSignature(
                0,
                std::slice::from_raw_parts(
                    serialized.GetBufferPointer() as _,
                    serialized.GetBufferSize(),
                ),
            )
            .map_err(|e| GraphicsError::ResourceCreation(format!("root signature: {:?}", e)).into())
    }
}

/// Assembles the graphics PSO: compiled shaders plus the fixed-function
/// block (solid fill, back-face cull, no blend, no depth/stencil, triangle
/// topology, one render target in the surface format).
fn build_pipeline_state(
    device: &ID3D12Device,
    root_signature: &ID3D12RootSignature,
    vs: &ID3DBlob,
    ps: &ID3DBlob,
) -> Result<ID3D12PipelineState> {
    // Must match `Vertex`: creation fails if the shader input signature
    // disagrees with this layout.
    let input_layout = [
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: s!("POSITION"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: 0,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: s!("COLOR"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: COLOR_OFFSET,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
    ];
    debug_assert_eq!(Vertex::stride(), 28);

    let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC::default();
    desc.pRootSignature = ManuallyDrop::new(Some(root_signature.clone()));
    desc.VS = D3D12_SHADER_BYTECODE {
        pShaderBytecode: unsafe { vs.GetBufferPointer() },
        BytecodeLength: unsafe { vs.GetBufferSize() },
    };
    desc.PS = D3D12_SHADER_BYTECODE {
        pShaderBytecode: unsafe { ps.GetBufferPointer() },
        BytecodeLength: unsafe { ps.GetBufferSize() },
    };
    desc.RasterizerState = D3D12_RASTERIZER_DESC {
        FillMode: D3D12_FILL_MODE_SOLID,
        CullMode: D3D12_CULL_MODE_BACK,
        DepthClipEnable: true.into(),
        ..Default::default()
    };
    desc.BlendState = D3D12_BLEND_DESC {
        AlphaToCoverageEnable: false.into(),
        IndependentBlendEnable: false.into(),
        RenderTarget: [
            D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: false.into(),
                LogicOpEnable: false.into(),
                RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
                ..Default::default()
            },
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
            D3D12_RENDER_TARGET_BLEND_DESC::default(),
        ],
    };
    desc.DepthStencilState.DepthEnable = false.into();
    desc.DepthStencilState.StencilEnable = false.into();
    desc.SampleMask = u32::MAX;
    desc.InputLayout = D3D12_INPUT_LAYOUT_DESC {
        pInputElementDescs: input_layout.as_ptr(),
        NumElements: input_layout.len() as u32,
    };
    desc.PrimitiveTopologyType = D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE;
    desc.NumRenderTargets = 1;
    desc.RTVFormats[0] = SURFACE_FORMAT;
    desc.SampleDesc.Count = 1;

    unsafe {
        device
            .CreateGraphicsPipelineState(&desc)
            .map_err(|e| GraphicsError::ResourceCreation(format!("pipeline state: {:?}", e)).into())
    }
}
