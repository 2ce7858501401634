//! The renderer: startup assembly and the per-frame record/submit/present
//! cycle.
//!
//! Construction runs the fixed dependency order device → pipeline →
//! geometry upload. Each `draw` call then performs one full cycle of the
//! frame state machine: reset the recording objects, transition the
//! current back buffer to render-target, clear, bind, draw, transition
//! back to present, submit, present with the configured sync interval, and
//! serialize against the fence. Exactly one synchronization per presented
//! frame; no pipelining across frames.

use tracing::{debug, info, trace, warn};
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::DXGI_PRESENT;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::core::config::{Config, BUFFER_COUNT};
use crate::core::error::{GraphicsError, Result};
use crate::gfx::context::Dx12Context;
use crate::gfx::pipeline::Pipeline;
use crate::gfx::sync::FrameFence;
use crate::gfx::upload::{d3d12_state, transition_barrier, upload_and_wait, UploadedBuffer};
use crate::render::frame::FrameCycle;
use crate::render::state::{ResourceState, TrackedState};
use crate::render::vertex::{Vertex, TRIANGLE};

pub struct Renderer {
    gfx: Dx12Context,
    fence: FrameFence,
    pipeline: Pipeline,
    vertex_buffer: UploadedBuffer,
    vertex_buffer_view: D3D12_VERTEX_BUFFER_VIEW,
    vertex_count: u32,
    allocator: ID3D12CommandAllocator,
    command_list: ID3D12GraphicsCommandList,
    viewport: D3D12_VIEWPORT,
    scissor_rect: RECT,
    cycle: FrameCycle,
    /// Shadow state per back buffer; both start in the present state.
    back_buffer_states: [TrackedState; BUFFER_COUNT as usize],
    clear_color: [f32; 4],
    sync_interval: u32,
}

impl Renderer {
    /// Builds every startup object in dependency order.
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        let gfx = Dx12Context::new(event_loop, config)?;
        let fence = FrameFence::new(&gfx.device)?;
        let pipeline = Pipeline::new(&gfx.device)?;

        // Geometry upload needs the queue and fence, hence last.
        let vertex_buffer = upload_and_wait(
            &gfx.device,
            &gfx.queue,
            &fence,
            bytemuck::cast_slice(&TRIANGLE),
            Vertex::stride(),
            ResourceState::VertexBuffer,
        )?;
        let vertex_buffer_view = vertex_buffer.vertex_view();
        let vertex_count = TRIANGLE.len() as u32;

        let allocator: ID3D12CommandAllocator = unsafe {
            gfx.device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                .map_err(|e| GraphicsError::ResourceCreation(format!("allocator: {:?}", e)))?
        };
        let command_list: ID3D12GraphicsCommandList = unsafe {
            gfx.device
                .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &allocator, None)
                .map_err(|e| GraphicsError::ResourceCreation(format!("command list: {:?}", e)))?
        };
        // Command lists are created open; close until the first frame.
        unsafe {
            command_list
                .Close()
                .map_err(|e| GraphicsError::CommandExecution(format!("initial close: {:?}", e)))?;
        }

        let viewport = D3D12_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: gfx.width as f32,
            Height: gfx.height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        let scissor_rect = RECT {
            left: 0,
            top: 0,
            right: gfx.width as i32,
            bottom: gfx.height as i32,
        };

        let cycle = FrameCycle::new(gfx.current_back_buffer());
        let back_buffer_states = [
            TrackedState::new(ResourceState::Present),
            TrackedState::new(ResourceState::Present),
        ];

        info!(
            vertices = vertex_count,
            width = gfx.width,
            height = gfx.height,
            "Renderer initialized"
        );

        Ok(Self {
            gfx,
            fence,
            pipeline,
            vertex_buffer,
            vertex_buffer_view,
            vertex_count,
            allocator,
            command_list,
            viewport,
            scissor_rect,
            cycle,
            back_buffer_states,
            clear_color: config.graphics.clear_color,
            sync_interval: config.sync_interval(),
        })
    }

    /// Records, submits, and presents one frame, then blocks until the GPU
    /// has retired it.
    pub fn draw(&mut self) -> Result<()> {
        // The state machine only admits this once the previous cycle has
        // fully completed, which is what makes the allocator reset safe.
        self.cycle.begin_recording()?;
        let index = self.cycle.back_buffer();

        unsafe {
            self.allocator
                .Reset()
                .map_err(|e| GraphicsError::CommandExecution(format!("allocator reset: {:?}", e)))?;
            self.command_list
                .Reset(&self.allocator, Some(&self.pipeline.state))
                .map_err(|e| GraphicsError::CommandExecution(format!("list reset: {:?}", e)))?;

            // (a) current back buffer becomes drawable
            self.back_buffer_states[index]
                .transition(ResourceState::Present, ResourceState::RenderTarget)?;
            self.command_list.ResourceBarrier(&[transition_barrier(
                &self.gfx.back_buffers[index],
                d3d12_state(ResourceState::Present),
                d3d12_state(ResourceState::RenderTarget),
            )]);

            // (b) full-surface viewport and scissor
            self.command_list.RSSetViewports(&[self.viewport]);
            self.command_list.RSSetScissorRects(&[self.scissor_rect]);

            // (c) bind the RTV created for this index and clear it
            let rtv_handle = self.gfx.rtv_handle(index);
            self.command_list
                .OMSetRenderTargets(1, Some(&rtv_handle), false, None);
            self.command_list
                .ClearRenderTargetView(rtv_handle, &self.clear_color, None);

            // (d) bind pipeline inputs
            self.command_list
                .SetGraphicsRootSignature(&self.pipeline.root_signature);
            self.command_list
                .IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.command_list
                .IASetVertexBuffers(0, Some(&[self.vertex_buffer_view]));

            // (e) non-indexed draw of the fixed vertex count
            self.command_list.DrawInstanced(self.vertex_count, 1, 0, 0);

            // (f) back to presentable
            self.back_buffer_states[index]
                .transition(ResourceState::RenderTarget, ResourceState::Present)?;
            self.command_list.ResourceBarrier(&[transition_barrier(
                &self.gfx.back_buffers[index],
                d3d12_state(ResourceState::RenderTarget),
                d3d12_state(ResourceState::Present),
            )]);

            // (g) finalize
            self.command_list
                .Close()
                .map_err(|e| GraphicsError::CommandExecution(format!("close: {:?}", e)))?;

            self.cycle.submit()?;
            let lists = [Some(self.command_list.clone().into())];
            self.gfx.queue.ExecuteCommandLists(&lists);

            self.cycle.present()?;
            self.gfx
                .swap_chain
                .Present(self.sync_interval, DXGI_PRESENT(0))
                .ok()
                .map_err(|e| GraphicsError::Swapchain(format!("present: {:?}", e)))?;
        }

        self.fence.signal_and_wait(&self.gfx.queue)?;
        self.cycle.complete(self.gfx.current_back_buffer())?;

        trace!(
            frame = self.cycle.frames_presented(),
            next_back_buffer = self.cycle.back_buffer(),
            ticket = self.fence.last_issued(),
            "Frame completed"
        );

        Ok(())
    }

    /// Blocks until the GPU has drained all submitted work.
    pub fn flush(&self) -> Result<()> {
        debug!("Flushing command queue");
        self.fence.signal_and_wait(&self.gfx.queue)
    }

    pub fn window(&self) -> &Window {
        self.gfx.window()
    }

    #[allow(dead_code)]
    pub fn vertex_buffer(&self) -> &UploadedBuffer {
        &self.vertex_buffer
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Destroying GPU objects while a batch is still in flight is not
        // safe; drain the queue first.
        if let Err(e) = self.flush() {
            warn!("Flush on shutdown failed: {}", e);
        }
        debug!("Renderer dropped with queue drained");
    }
}
