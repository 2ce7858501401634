//! Direct3D 12 device context: device, queue, presentation surface.
//!
//! Built once at startup in a fixed order: debug layer (debug builds),
//! DXGI factory, device, direct command queue, flip-discard swap chain with
//! two back buffers, RTV heap with one slot per buffer. Any failure here is
//! fatal: the caller reports the diagnostic and the process exits. There
//! is no partial-degradation path.

use std::sync::Arc;
use tracing::{debug, info};
use windows::{
    core::*, Win32::Graphics::Direct3D::*, Win32::Graphics::Direct3D12::*,
    Win32::Graphics::Dxgi::Common::*, Win32::Graphics::Dxgi::*,
};
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::{Window, WindowBuilder};

use crate::core::config::{Config, BUFFER_COUNT};
use crate::core::error::{FrameLoopError, GraphicsError, Result};
use crate::render::descriptor::HeapLayout;

/// Pixel format shared by the swap chain and the pipeline's render target.
pub const SURFACE_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;

/// Owns the device-level objects every other component borrows.
pub struct Dx12Context {
    pub device: ID3D12Device,
    pub queue: ID3D12CommandQueue,
    pub swap_chain: IDXGISwapChain3,
    /// RTV descriptor heap; kept alive for the surface's lifetime.
    pub rtv_heap: ID3D12DescriptorHeap,
    /// Typed offset math over `rtv_heap`.
    rtv_layout: HeapLayout,
    /// The two presentable images, indexed by back-buffer index.
    pub back_buffers: [ID3D12Resource; BUFFER_COUNT as usize],
    pub window: Arc<Window>,
    pub width: u32,
    pub height: u32,
}

// D3D12 device-level objects are free-threaded; this core only ever touches
// them from the render thread.
unsafe impl Send for Dx12Context {}

impl Dx12Context {
    /// Creates the window and all device-level objects.
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        let width = config.window.width;
        let height = config.window.height;

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.window.title)
                .with_inner_size(LogicalSize::new(width, height))
                .with_resizable(false)
                .build(event_loop)
                .map_err(|e| FrameLoopError::Initialization(format!("window: {}", e)))?,
        );

        unsafe {
            #[cfg(debug_assertions)]
            {
                let mut debug_controller: Option<ID3D12Debug> = None;
                if D3D12GetDebugInterface(&mut debug_controller).is_ok() {
                    if let Some(debug_controller) = debug_controller {
                        debug_controller.EnableDebugLayer();
                        debug!("D3D12 debug layer enabled");
                    }
                } else {
                    tracing::warn!("Failed to enable D3D12 debug layer");
                }
            }

            let factory_flags = if cfg!(debug_assertions) {
                DXGI_CREATE_FACTORY_DEBUG
            } else {
                DXGI_CREATE_FACTORY_FLAGS(0)
            };
            let factory: IDXGIFactory4 = CreateDXGIFactory2(factory_flags)
                .map_err(|e| GraphicsError::DeviceCreation(format!("DXGI factory: {:?}", e)))?;

            let mut device: Option<ID3D12Device> = None;
            D3D12CreateDevice(None, D3D_FEATURE_LEVEL_11_0, &mut device)
                .map_err(|e| GraphicsError::DeviceCreation(format!("D3D12 device: {:?}", e)))?;
            let device = device.ok_or_else(|| {
                GraphicsError::DeviceCreation("D3D12CreateDevice returned no device".to_string())
            })?;

            debug!("D3D12 device created");

            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            };
            let queue: ID3D12CommandQueue = device
                .CreateCommandQueue(&queue_desc)
                .map_err(|e| GraphicsError::DeviceCreation(format!("command queue: {:?}", e)))?;

            // The swap chain is created against the queue, so it must exist
            // first.
            let window_handle = window
                .window_handle()
                .map_err(|e| FrameLoopError::Initialization(format!("window handle: {}", e)))?;
            let hwnd = match window_handle.as_raw() {
                RawWindowHandle::Win32(handle) => windows::Win32::Foundation::HWND(
                    handle.hwnd.get() as *mut std::ffi::c_void,
                ),
                _ => {
                    return Err(FrameLoopError::Initialization(
                        "expected a Win32 window handle".to_string(),
                    ))
                }
            };

            let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: SURFACE_FORMAT,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    ..Default::default()
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: BUFFER_COUNT,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                ..Default::default()
            };

            let swap_chain: IDXGISwapChain1 = factory
                .CreateSwapChainForHwnd(&queue, hwnd, &swap_chain_desc, None, None)
                .map_err(|e| GraphicsError::Swapchain(format!("creation: {:?}", e)))?;
            let swap_chain: IDXGISwapChain3 = swap_chain
                .cast()
                .map_err(|e| GraphicsError::Swapchain(format!("IDXGISwapChain3 cast: {:?}", e)))?;

            info!(width, height, buffers = BUFFER_COUNT, "Swap chain created");

            let rtv_heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: BUFFER_COUNT,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            };
            let rtv_heap: ID3D12DescriptorHeap = device
                .CreateDescriptorHeap(&rtv_heap_desc)
                .map_err(|e| GraphicsError::ResourceCreation(format!("RTV heap: {:?}", e)))?;
            let rtv_layout = HeapLayout::new(
                rtv_heap.GetCPUDescriptorHandleForHeapStart().ptr,
                device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) as usize,
                BUFFER_COUNT as usize,
            );

            // One render-target view per back buffer, in slot order. The
            // view in slot i is the one bound whenever buffer i is current.
            let get_buffer = |i: u32| -> Result<ID3D12Resource> {
                swap_chain
                    .GetBuffer(i)
                    .map_err(|e| GraphicsError::Swapchain(format!("buffer {}: {:?}", i, e)).into())
            };
            let back_buffers = [get_buffer(0)?, get_buffer(1)?];
            for (i, buffer) in back_buffers.iter().enumerate() {
                let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                    ptr: rtv_layout.at(i),
                };
                device.CreateRenderTargetView(buffer, None, handle);
            }

            debug!("Render-target views created");

            Ok(Self {
                device,
                queue,
                swap_chain,
                rtv_heap,
                rtv_layout,
                back_buffers,
                window,
                width,
                height,
            })
        }
    }

    /// CPU descriptor handle of the render-target view for back buffer
    /// `index`.
    pub fn rtv_handle(&self, index: usize) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.rtv_layout.at(index),
        }
    }

    /// Back-buffer index the swap chain reports as current.
    pub fn current_back_buffer(&self) -> usize {
        unsafe { self.swap_chain.GetCurrentBackBufferIndex() as usize }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
