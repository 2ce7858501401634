//! One-shot synchronous resource upload.
//!
//! `upload_and_wait` moves caller bytes into a GPU-resident (default-heap)
//! buffer: a transient host-writable staging buffer is filled by memcpy,
//! a copy command and then a state-transition barrier are submitted, and
//! the call blocks on the fence until the GPU has retired both. The
//! staging buffer is discarded on return. This is deliberately a blocking
//! startup-only path; there is no streaming upload in this core, and the
//! name says so.

use std::mem::ManuallyDrop;
use tracing::debug;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use crate::core::error::{GraphicsError, Result};
use crate::gfx::sync::FrameFence;
use crate::render::state::{ResourceState, TrackedState};

/// A GPU-resident buffer plus the view parameters needed to bind it.
pub struct UploadedBuffer {
    pub resource: ID3D12Resource,
    /// Total size in bytes.
    pub size: u32,
    /// Per-element stride in bytes.
    pub stride: u32,
}

impl UploadedBuffer {
    /// Vertex-buffer view: base GPU address, total size, stride.
    pub fn vertex_view(&self) -> D3D12_VERTEX_BUFFER_VIEW {
        D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { self.resource.GetGPUVirtualAddress() },
            SizeInBytes: self.size,
            StrideInBytes: self.stride,
        }
    }
}

/// Uploads `bytes` into a new default-heap buffer and transitions it to
/// `final_state`. Fully synchronous: returns only after the GPU has
/// finished both the copy and the transition.
pub fn upload_and_wait(
    device: &ID3D12Device,
    queue: &ID3D12CommandQueue,
    fence: &FrameFence,
    bytes: &[u8],
    stride: u32,
    final_state: ResourceState,
) -> Result<UploadedBuffer> {
    let size = bytes.len() as u64;

    // Destination lives in GPU-local memory and starts as a copy target.
    let destination = create_buffer(
        device,
        size,
        D3D12_HEAP_TYPE_DEFAULT,
        D3D12_RESOURCE_STATE_COPY_DEST,
    )?;
    let mut tracked = TrackedState::new(ResourceState::CopyDest);

    // Transient staging buffer the CPU can write directly.
    let staging = create_buffer(
        device,
        size,
        D3D12_HEAP_TYPE_UPLOAD,
        D3D12_RESOURCE_STATE_GENERIC_READ,
    )?;

    unsafe {
        let mut mapped = std::ptr::null_mut();
        staging
            .Map(0, None, Some(&mut mapped))
            .map_err(|e| GraphicsError::ResourceCreation(format!("staging map: {:?}", e)))?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped as *mut u8, bytes.len());
        staging.Unmap(0, None);
    }

    // Transient recording objects; the upload happens before the frame
    // loop owns any, and they are dropped with the staging buffer.
    let allocator: ID3D12CommandAllocator = unsafe {
        device
            .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
            .map_err(|e| GraphicsError::ResourceCreation(format!("upload allocator: {:?}", e)))?
    };
    let list: ID3D12GraphicsCommandList = unsafe {
        device
            .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator, None)
            .map_err(|e| GraphicsError::ResourceCreation(format!("upload list: {:?}", e)))?
    };

    unsafe {
        // First submission: staging -> destination.
        list.CopyResource(&destination, &staging);
        list.Close()
            .map_err(|e| GraphicsError::CommandExecution(format!("upload copy close: {:?}", e)))?;
        let lists = [Some(list.clone().into())];
        queue.ExecuteCommandLists(&lists);

        // Second submission: transition the destination to its usage state.
        tracked.transition(ResourceState::CopyDest, final_state)?;
        list.Reset(&allocator, None)
            .map_err(|e| GraphicsError::CommandExecution(format!("upload list reset: {:?}", e)))?;
        let barrier = transition_barrier(
            &destination,
            d3d12_state(ResourceState::CopyDest),
            d3d12_state(final_state),
        );
        list.ResourceBarrier(&[barrier]);
        list.Close().map_err(|e| {
            GraphicsError::CommandExecution(format!("upload barrier close: {:?}", e))
        })?;
        let lists = [Some(list.clone().into())];
        queue.ExecuteCommandLists(&lists);
    }

    // Same queue, so the barrier retires after the copy; one wait covers
    // both submissions. The staging buffer may only be freed after this.
    fence.signal_and_wait(queue)?;

    debug!(bytes = bytes.len(), ?final_state, "Upload completed");

    Ok(UploadedBuffer {
        resource: destination,
        size: bytes.len() as u32,
        stride,
    })
}

/// Creates a committed buffer resource in the given heap and initial state.
fn create_buffer(
    device: &ID3D12Device,
    size: u64,
    heap_type: D3D12_HEAP_TYPE,
    initial_state: D3D12_RESOURCE_STATES,
) -> Result<ID3D12Resource> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: heap_type,
        ..Default::default()
    };
    let desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Width: size,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_UNKNOWN,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        ..Default::default()
    };

    let mut resource: Option<ID3D12Resource> = None;
    unsafe {
        device
            .CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &desc,
                initial_state,
                None,
                &mut resource,
            )
            .map_err(|e| GraphicsError::ResourceCreation(format!("buffer: {:?}", e)))?;
    }
    resource.ok_or_else(|| {
        GraphicsError::ResourceCreation("CreateCommittedResource returned no buffer".to_string())
            .into()
    })
}

/// Builds a transition barrier over all subresources.
pub(crate) fn transition_barrier(
    resource: &ID3D12Resource,
    before: D3D12_RESOURCE_STATES,
    after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: ManuallyDrop::new(Some(resource.clone())),
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: before,
                StateAfter: after,
            }),
        },
    }
}

/// Maps the tracked usage states onto native resource states.
pub(crate) fn d3d12_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::CopyDest => D3D12_RESOURCE_STATE_COPY_DEST,
        ResourceState::GenericRead => D3D12_RESOURCE_STATE_GENERIC_READ,
        ResourceState::VertexBuffer => D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
    }
}
